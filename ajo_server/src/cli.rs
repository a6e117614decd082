use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // AJO_PAYSTACK_SECRET_KEY is deliberately absent
    const DISPLAY_ENVS: [&str; 8] = [
        "RUST_LOG",
        "AJO_HOST",
        "AJO_PORT",
        "AJO_DATABASE_URL",
        "AJO_CALLBACK_URL",
        "AJO_CYCLE_ROLL_INTERVAL",
        "AJO_PAYSTACK_BASE_URL",
        "AJO_PAYSTACK_TIMEOUT",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
