pub fn display_error(message: &str) {
    eprintln!("\x1b[31mERROR:\x1b[0m {}", message); // Red color
}

pub fn display_warning(message: &str) {
    eprintln!("\x1b[33mWARNING:\x1b[0m {}", message); // Yellow color
}

pub fn display_success(message: &str) {
    println!("\x1b[32m✓\x1b[0m {}", message); // Green color
}

pub fn display_status(message: &str) {
    println!("\x1b[33m→\x1b[0m {}", message); // Yellow color
}

pub fn display_dry_run(file_path: &str, message: &str, manifest: &str) {
    println!("\n\x1b[1mDry run - nothing was published\x1b[0m");
    println!("  Path:    \x1b[32m{}\x1b[0m", file_path);
    println!("  Message: {}", message.lines().next().unwrap_or(""));
    println!("\n\x1b[4mManifest:\x1b[0m");
    for line in manifest.lines() {
        println!("  {}", line);
    }
}
