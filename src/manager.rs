//! Interactive text menu over the reflections collection.
//!
//! Reads choices line by line from any `BufRead` and writes to any `Write`,
//! so the same loop drives a terminal or a test buffer.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use journal_record_store::{ReflectionBook, StoreError};
use tracing::debug;

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";
const PREVIEW_CHARS: usize = 50;
const CLEAR_CONFIRMATION: &str = "DELETE";
const FILE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    Add,
    View,
    Delete,
    Clear,
    FileInfo,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 6] = [
        MenuChoice::Add,
        MenuChoice::View,
        MenuChoice::Delete,
        MenuChoice::Clear,
        MenuChoice::FileInfo,
        MenuChoice::Exit,
    ];

    fn label(self) -> &'static str {
        match self {
            MenuChoice::Add => "Add New Reflection",
            MenuChoice::View => "View All Reflections",
            MenuChoice::Delete => "Delete Reflection",
            MenuChoice::Clear => "Clear All Reflections",
            MenuChoice::FileInfo => "File Information",
            MenuChoice::Exit => "Exit",
        }
    }
}

impl FromStr for MenuChoice {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "1" => Ok(MenuChoice::Add),
            "2" => Ok(MenuChoice::View),
            "3" => Ok(MenuChoice::Delete),
            "4" => Ok(MenuChoice::Clear),
            "5" => Ok(MenuChoice::FileInfo),
            "6" => Ok(MenuChoice::Exit),
            other => Err(format!("unknown menu option '{other}'")),
        }
    }
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub struct ConsoleManager<R, W> {
    book: ReflectionBook,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleManager<R, W> {
    pub fn new(book: ReflectionBook, input: R, output: W) -> Self {
        Self {
            book,
            input,
            output,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Loops until the user picks Exit or input reaches end of file.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.print_menu()?;
            let Some(line) = self.prompt("\nChoose an option (1-6): ")? else {
                writeln!(self.output)?;
                return Ok(());
            };
            let choice = match line.parse::<MenuChoice>() {
                Ok(choice) => choice,
                Err(_) => {
                    writeln!(self.output, "Invalid choice. Please try again.")?;
                    continue;
                }
            };
            debug!(%choice, "menu option selected");

            let keep_going = match choice {
                MenuChoice::Add => self.add_reflection()?,
                MenuChoice::View => self.view_reflections()?,
                MenuChoice::Delete => self.delete_reflection()?,
                MenuChoice::Clear => self.clear_reflections()?,
                MenuChoice::FileInfo => self.show_file_info()?,
                MenuChoice::Exit => {
                    writeln!(self.output, "\nGoodbye! Your reflections are saved.")?;
                    return Ok(());
                }
            };
            if !keep_going {
                writeln!(self.output)?;
                return Ok(());
            }
        }
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n{RULE}")?;
        writeln!(self.output, "           LEARNING JOURNAL - REFLECTION MANAGER")?;
        writeln!(self.output, "{RULE}")?;
        for (number, choice) in MenuChoice::ALL.iter().enumerate() {
            writeln!(self.output, "{}. {}", number + 1, choice)?;
        }
        writeln!(self.output, "{THIN_RULE}")
    }

    /// `Ok(None)` means the input is exhausted.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn report(&mut self, err: &StoreError) -> io::Result<()> {
        writeln!(self.output, "Error: {err}")
    }

    // Each operation returns `Ok(false)` when input ran out mid-prompt.

    fn add_reflection(&mut self) -> io::Result<bool> {
        writeln!(self.output, "\n{RULE}\n    ADD NEW REFLECTION\n{RULE}")?;
        let Some(name) = self.prompt("Enter your name: ")? else {
            return Ok(false);
        };
        let Some(text) = self.prompt("Enter your reflection: ")? else {
            return Ok(false);
        };

        match self.book.add(Some(name.as_str()), &text) {
            Ok(entry) => {
                let total = self.book.list().map(|all| all.len()).unwrap_or(0);
                writeln!(self.output, "Reflection added successfully!")?;
                writeln!(self.output, "Total reflections: {total}")?;
                writeln!(self.output, "Date: {}", entry.date)?;
                writeln!(self.output, "Name: {}", entry.name)?;
                writeln!(self.output, "Reflection: {}", preview(&entry.reflection))?;
            }
            Err(StoreError::EmptyReflection) => {
                writeln!(self.output, "Reflection cannot be empty!")?;
            }
            Err(err) => self.report(&err)?,
        }
        Ok(true)
    }

    fn view_reflections(&mut self) -> io::Result<bool> {
        let entries = match self.book.list() {
            Ok(entries) => entries,
            Err(err) => {
                self.report(&err)?;
                return Ok(true);
            }
        };

        writeln!(self.output, "\nREFLECTIONS ({} entries)", entries.len())?;
        writeln!(self.output, "{RULE}")?;
        if entries.is_empty() {
            writeln!(self.output, "No reflections found. Add some using option 1!")?;
            return Ok(true);
        }
        for (number, entry) in entries.iter().enumerate() {
            writeln!(self.output, "\n{}. {} - {}", number + 1, entry.date, entry.name)?;
            writeln!(self.output, "   {}", entry.reflection)?;
            writeln!(self.output, "{}", &THIN_RULE[..50])?;
        }
        Ok(true)
    }

    fn delete_reflection(&mut self) -> io::Result<bool> {
        let entries = match self.book.list() {
            Ok(entries) => entries,
            Err(err) => {
                self.report(&err)?;
                return Ok(true);
            }
        };
        if entries.is_empty() {
            writeln!(self.output, "No reflections to delete")?;
            return Ok(true);
        }

        writeln!(self.output, "\nDELETE REFLECTION")?;
        writeln!(self.output, "{}", &RULE[..40])?;
        for (number, entry) in entries.iter().enumerate() {
            writeln!(self.output, "{}. {} - {}", number + 1, entry.date, entry.name)?;
            writeln!(self.output, "   {}", preview(&entry.reflection))?;
        }

        let label = format!("\nEnter number to delete (1-{}): ", entries.len());
        let Some(answer) = self.prompt(&label)? else {
            return Ok(false);
        };
        let Ok(number) = answer.trim().parse::<i64>() else {
            writeln!(self.output, "Please enter a valid number")?;
            return Ok(true);
        };

        let Some(index) = number.checked_sub(1) else {
            writeln!(self.output, "Invalid choice")?;
            return Ok(true);
        };

        match self.book.delete(index) {
            Ok(deleted) => {
                let remaining = self.book.list().map(|all| all.len()).unwrap_or(0);
                writeln!(self.output, "Deleted: {} - {}", deleted.date, deleted.name)?;
                writeln!(self.output, "Remaining reflections: {remaining}")?;
            }
            Err(StoreError::IndexOutOfRange { .. }) => {
                writeln!(self.output, "Invalid choice")?;
            }
            Err(err) => self.report(&err)?,
        }
        Ok(true)
    }

    fn clear_reflections(&mut self) -> io::Result<bool> {
        let count = match self.book.list() {
            Ok(entries) => entries.len(),
            Err(err) => {
                self.report(&err)?;
                return Ok(true);
            }
        };
        if count == 0 {
            writeln!(self.output, "No reflections to clear")?;
            return Ok(true);
        }

        writeln!(self.output, "\nCLEAR ALL REFLECTIONS")?;
        writeln!(self.output, "{}", &RULE[..40])?;
        writeln!(self.output, "This will delete ALL {count} reflections!")?;
        let Some(answer) =
            self.prompt(&format!("Type '{CLEAR_CONFIRMATION}' to confirm: "))?
        else {
            return Ok(false);
        };

        if answer.trim().eq_ignore_ascii_case(CLEAR_CONFIRMATION) {
            match self.book.clear() {
                Ok(_) => writeln!(self.output, "All reflections cleared!")?,
                Err(err) => self.report(&err)?,
            }
        } else {
            writeln!(self.output, "Clear operation cancelled")?;
        }
        Ok(true)
    }

    fn show_file_info(&mut self) -> io::Result<bool> {
        let info = match self.book.file_info() {
            Ok(Some(info)) => info,
            Ok(None) => {
                writeln!(self.output, "No reflections file found")?;
                return Ok(true);
            }
            Err(err) => {
                self.report(&err)?;
                return Ok(true);
            }
        };
        let Some(entries) = info.entries else {
            writeln!(self.output, "File exists but is corrupted")?;
            return Ok(true);
        };

        writeln!(self.output, "\nFILE INFORMATION")?;
        writeln!(self.output, "{}", &RULE[..40])?;
        writeln!(self.output, "File: {}", info.path.display())?;
        writeln!(self.output, "Size: {} bytes", info.size_bytes)?;
        writeln!(self.output, "Entries: {entries}")?;
        writeln!(
            self.output,
            "Created: {}",
            info.created.format(FILE_TIME_FORMAT)
        )?;
        writeln!(
            self.output,
            "Modified: {}",
            info.modified.format(FILE_TIME_FORMAT)
        )?;
        Ok(true)
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}
