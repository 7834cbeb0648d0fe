use super::FormatOptions;
use super::diagnostics::{CodeFrame, Message, Severity};

use sable_formatter::Config;
use sable_syntax::AST;

use anstream::{eprintln, print};
use std::fs;

pub enum CommandStatus {
  /// Command was successful, no errors or warnings occurred
  Success,
  /// Command was successful, but warnings occurred
  Failure,
}

fn read_file(filename: &str) -> Result<String, ()> {
  if filename == "-" {
    return read_stdin();
  }

  match fs::read_to_string(filename) {
    Ok(file) if file.is_empty() => {
      eprintln!("{}", Message::warning(format!("Empty file `{filename}`")));
      Err(())
    }
    Ok(file) if file.len() > u32::MAX as usize => {
      eprintln!("{}", Message::error("File too large - max size 4GB".into()));
      Err(())
    }
    Ok(file) => Ok(file),
    Err(_) => {
      eprintln!("{}", Message::error(format!("File not found `{filename}`")));
      Err(())
    }
  }
}

fn read_stdin() -> Result<String, ()> {
  use std::io::{self, Read};

  let mut buffer = String::new();
  let mut stdin = io::stdin().lock();

  match stdin.read_to_string(&mut buffer) {
    Ok(_) if buffer.len() > u32::MAX as usize => {
      eprintln!("{}", Message::error("File too large - max size 4GB".into()));
      Err(())
    }
    Ok(_) => Ok(buffer),
    Err(_) => {
      eprintln!("{}", Message::error("Problem reading from STDIN".into()));
      Err(())
    }
  }
}

fn parse(filename: &str, source: &str) -> Result<AST, ()> {
  let ast = sable_syntax::parse(source);

  if ast.is_valid() {
    Ok(ast)
  } else {
    for error in &ast.errors {
      eprintln!("{}", Message::from(error));
      eprintln!("{}", CodeFrame::new(filename, source, error.line));
    }
    Err(())
  }
}

pub fn format(options: &FormatOptions) -> Result<CommandStatus, ()> {
  let config = Config {
    print_width: options.config_print_width,
    rename_deprecated_at: options.config_target_version,
    ..Config::default()
  };

  let source = read_file(&options.file)?;
  let ast = parse(&options.file, &source)?;
  let formatted_source = sable_formatter::format(&ast, &config);

  if options.dryrun {
    print!("{formatted_source}");
    return Ok(CommandStatus::Success);
  }

  if options.check && formatted_source != source {
    eprintln!("{}", Message {
      title: "File is not formatted".into(),
      body: format!("`{}` is not formatted", options.file),
      severity: Severity::Error,
    });
    return Ok(CommandStatus::Failure);
  }

  if options.file == "-" {
    print!("{formatted_source}");
    return Ok(CommandStatus::Success);
  }

  if formatted_source != source && fs::write(&options.file, formatted_source).is_err() {
    eprintln!("{}", Message::error("Problem writing to file".into()));
    return Err(());
  }

  Ok(CommandStatus::Success)
}
