use crate::domain::Order;
use std::io::{self, BufRead, Write};

/// Top-level run state: each pass either runs the pipeline again or stops.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Lifecycle {
    Run,
    Exit,
}

/// Prints `prompt` and reads one line. Returns `None` at end of input.
pub fn prompt_line(
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub fn write_selection_summary(output: &mut dyn Write, orders: &[&Order]) -> io::Result<()> {
    writeln!(output)?;
    writeln!(output, "Selected {} orders for deletion:", orders.len())?;
    for order in orders {
        writeln!(
            output,
            "- {} ({}) - {}",
            order.display_name, order.order_id, order.status_text
        )?;
    }
    Ok(())
}

/// Only an explicit `y` proceeds.
pub fn confirm_deletion(input: &mut dyn BufRead, output: &mut dyn Write) -> io::Result<bool> {
    let answer = prompt_line(input, output, "\nDelete these orders? (Y/N): ")?;
    Ok(answer.is_some_and(|answer| answer.eq_ignore_ascii_case("y")))
}

pub fn ask_restart(input: &mut dyn BufRead, output: &mut dyn Write) -> io::Result<Lifecycle> {
    loop {
        let Some(answer) = prompt_line(input, output, "\nExit (T) / Restart (S): ")? else {
            return Ok(Lifecycle::Exit);
        };
        if answer.eq_ignore_ascii_case("t") {
            return Ok(Lifecycle::Exit);
        }
        if answer.eq_ignore_ascii_case("s") {
            return Ok(Lifecycle::Run);
        }
        writeln!(output, "Please enter T or S")?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_confirm(text: &str) -> bool {
        let mut input = Cursor::new(text.as_bytes().to_vec());
        let mut output = Vec::new();
        confirm_deletion(&mut input, &mut output).expect("confirm")
    }

    #[test]
    fn confirm_accepts_only_y() {
        assert!(run_confirm("y\n"));
        assert!(run_confirm(" Y \n"));
        assert!(!run_confirm("yes\n"));
        assert!(!run_confirm("n\n"));
        assert!(!run_confirm(""));
    }

    #[test]
    fn restart_prompt_repeats_until_valid() {
        let mut input = Cursor::new(b"x\n\ns\n".to_vec());
        let mut output = Vec::new();
        let next = ask_restart(&mut input, &mut output).expect("restart");
        assert_eq!(next, Lifecycle::Run);
        let text = String::from_utf8(output).expect("utf8");
        assert_eq!(text.matches("Please enter T or S").count(), 2);
    }

    #[test]
    fn restart_prompt_exits_on_t_or_eof() {
        let mut output = Vec::new();
        let mut input = Cursor::new(b"T\n".to_vec());
        assert_eq!(ask_restart(&mut input, &mut output).expect("t"), Lifecycle::Exit);
        let mut input = Cursor::new(Vec::new());
        assert_eq!(ask_restart(&mut input, &mut output).expect("eof"), Lifecycle::Exit);
    }

    #[test]
    fn summary_lists_each_order() {
        let order = Order {
            order_id: "7".to_string(),
            order_type: None,
            display_name: "Live".to_string(),
            status_text: "paid".to_string(),
            created_at: None,
        };
        let mut output = Vec::new();
        write_selection_summary(&mut output, &[&order]).expect("write");
        let text = String::from_utf8(output).expect("utf8");
        assert!(text.contains("Selected 1 orders"));
        assert!(text.contains("- Live (7) - paid"));
    }
}
