use std::io::{self, Write};

pub fn show_menu() {
    println!("\n===========================================");
    println!("Robot Control Node");
    println!("===========================================");
    println!("Select an option:");
    println!("1. Move Joints Demo");
    println!("2. Gripper Demo");
    println!("3. Poll Node State & Status");
    println!("4. Busy Rejection Demo");
    println!("5. Exit");
    println!("===========================================");
    print!("Choice (1-5): ");
    io::stdout().flush().unwrap();
}

pub fn get_user_choice() -> Result<u32, std::num::ParseIntError> {
    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();
    input.trim().parse::<u32>()
}

pub fn wait_for_enter() {
    println!("\nPress Enter to return to menu...");
    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();
}
