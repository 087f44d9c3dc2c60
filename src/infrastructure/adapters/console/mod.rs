//! Console adapter for development/testing

/// Console front end for local development
pub struct ConsoleAdapter {
    name: String,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn read_line(&self, prompt: &str) -> Option<String> {
        use std::io::Write;
        print!("{}", prompt);
        let _ = std::io::stdout().flush();
        let mut input = String::new();
        match std::io::stdin().read_line(&mut input) {
            Ok(0) => None,
            Ok(_) => Some(input.trim().to_string()),
            Err(_) => None,
        }
    }

    pub fn send(&self, text: &str) {
        println!("[BOT] {}", text);
    }
}
