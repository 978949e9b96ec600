//! Interactive operator console
//!
//! Blocks on stdin with no timeout. The process suspends for as long
//! as the operator takes to answer.

use std::io::{self, BufRead, Write};

use crate::application::ports::outbound::{ReviewPort, Verdict};

#[derive(Debug, Default)]
pub struct ConsoleReview;

impl ConsoleReview {
    pub fn new() -> Self {
        Self
    }

    fn ask_yes_no(&self, question: &str) -> io::Result<bool> {
        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            print!("{} [y/n] ", question);
            io::stdout().flush()?;
            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                // stdin closed; treat as a refusal rather than spinning
                return Ok(false);
            }
            match line.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => println!("Please answer y or n."),
            }
        }
    }
}

impl ReviewPort for ConsoleReview {
    fn review(&mut self, label: &str, suggestion: &str) -> io::Result<Verdict> {
        println!("\n--- Proposed {} ---", label);
        println!("{}", suggestion.trim());
        println!("---");
        if self.ask_yes_no(&format!("Accept this {}?", label))? {
            Ok(Verdict::Accept)
        } else {
            Ok(Verdict::Reject)
        }
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.ask_yes_no(question)
    }
}
