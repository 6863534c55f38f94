use crate::report::format_size;
use std::io::{self, BufRead, Write};
use tracing::warn;
use vaultsweep_core::cleanup::{Confirmation, ConfirmDeletion, DeletionPlan};

/// Ask a yes/no question until the answer is one of `y`, `n`, or empty with
/// a default. End of input answers with the default, or "no" without one.
pub fn prompt_confirm(
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    prompt: &str,
    default: Option<bool>,
) -> io::Result<bool> {
    let mut line = String::new();

    loop {
        line.clear();

        match default {
            Some(true) => write!(output, "{prompt} (Y/n): ")?,
            Some(false) | None => write!(output, "{prompt} (y/N): ")?,
        }
        output.flush()?;

        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(default.unwrap_or(false));
        }

        match line.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}

/// Lists the plan on a terminal and asks once for the whole of it.
pub struct TerminalConfirm<R, W> {
    input: R,
    output: W,
}

impl TerminalConfirm<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, plan: &DeletionPlan) -> io::Result<bool> {
        writeln!(self.output)?;
        for file in &plan.files {
            writeln!(self.output, "  {:>10}  {}", format_size(file.size), file.path)?;
        }
        for folder in &plan.folders {
            writeln!(self.output, "  {:>10}  {}/", "folder", folder.path)?;
        }
        let prompt = format!(
            "{} {} item(s)?",
            capitalise(plan.destination.label()),
            plan.len()
        );
        prompt_confirm(&mut self.input, &mut self.output, &prompt, Some(false))
    }
}

impl<R: BufRead, W: Write> ConfirmDeletion for TerminalConfirm<R, W> {
    fn confirm(&mut self, plan: &DeletionPlan) -> Confirmation {
        match self.ask(plan) {
            Ok(true) => Confirmation::Proceed(plan.paths().map(str::to_owned).collect()),
            Ok(false) => Confirmation::Abort,
            Err(err) => {
                warn!("confirmation prompt failed: {err}");
                Confirmation::Abort
            }
        }
    }
}

fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use vaultsweep_core::settings::DeletionDestination;

    fn answer(input: &str, default: Option<bool>) -> bool {
        let mut output = Vec::new();
        prompt_confirm(&mut Cursor::new(input), &mut output, "Go?", default).expect("prompt")
    }

    #[test]
    fn explicit_answers() {
        assert!(answer("y\n", None));
        assert!(answer("YES\n", Some(false)));
        assert!(!answer("n\n", Some(true)));
    }

    #[test]
    fn empty_line_takes_the_default() {
        assert!(answer("\n", Some(true)));
        assert!(!answer("\n", Some(false)));
    }

    #[test]
    fn garbage_is_asked_again() {
        assert!(answer("maybe\n\ny\n", None));
    }

    #[test]
    fn end_of_input_is_no_without_default() {
        assert!(!answer("", None));
        assert!(answer("", Some(true)));
    }

    #[test]
    fn terminal_confirm_lists_the_plan() {
        let plan = DeletionPlan {
            files: Vec::new(),
            folders: Vec::new(),
            destination: DeletionDestination::HostTrash,
        };
        let mut output = Vec::new();
        let mut confirm = TerminalConfirm::new(Cursor::new("y\n"), &mut output);
        assert_eq!(confirm.confirm(&plan), Confirmation::Proceed(Vec::new()));
        drop(confirm);

        let shown = String::from_utf8(output).expect("utf-8");
        assert!(shown.contains("Move to vault trash 0 item(s)? (y/N)"));
    }
}
