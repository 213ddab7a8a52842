//! Logging setup and export of rendered equations to markdown, csv and table form.
use crate::translator::errors::{CalcError, Result};
use crate::translator::pipeline::TranslatedEquation;
use chrono::Local;
use csv::Writer;
use log::{LevelFilter, info};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tabled::{builder::Builder, settings::Style};

/// level name -> filter; `off`/`none` disable logging
pub fn level_filter(loglevel: &str) -> Result<LevelFilter> {
    match loglevel.trim().to_lowercase().as_str() {
        "off" | "none" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(CalcError::Config(format!(
            "loglevel must be off, error, warn, info, debug or trace, found `{}`",
            other
        ))),
    }
}

/// log file name with the current date and time
pub fn default_log_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// terminal logger, plus a file logger when `log_file` is given ("auto" picks a timestamped name).
/// A logger that is already installed stays in place.
pub fn init_logging(loglevel: &str, log_file: Option<&str>) -> Result<()> {
    let level = level_filter(loglevel)?;
    if level == LevelFilter::Off {
        return Ok(());
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));
    if let Some(name) = log_file {
        let name = if name == "auto" {
            default_log_name()
        } else {
            name.to_string()
        };
        loggers.push(WriteLogger::new(level, Config::default(), File::create(name)?));
    }
    let _ = CombinedLogger::init(loggers);
    Ok(())
}

/// writes rendered markup to a markdown file, replacing its content
pub fn save_markup_to_file<P: AsRef<Path>>(markup: &str, path: P) -> Result<()> {
    let mut file = File::create(path.as_ref())?;
    writeln!(file, "{}", markup)?;
    info!("markup saved to {}", path.as_ref().display());
    Ok(())
}

/// name, expression and value markup of every equation; unresolved values stay empty
pub fn save_equations_to_csv<P: AsRef<Path>>(equations: &[TranslatedEquation], path: P) -> Result<()> {
    let mut writer = Writer::from_path(path.as_ref())?;
    writer.write_record(["name", "expression", "value"])?;
    for eq in equations {
        writer.write_record([
            eq.equation.name(),
            eq.expression_markup.as_str(),
            eq.value_markup.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    info!("{} equations saved to {}", equations.len(), path.as_ref().display());
    Ok(())
}

/// two column markdown table, the value column falls back to the expression
pub fn equations_to_markdown_table(equations: &[TranslatedEquation]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Bezeichnung", "Wert"]);
    for eq in equations {
        let value = eq
            .value_markup
            .as_deref()
            .unwrap_or(eq.expression_markup.as_str());
        builder.push_record([format!("${}$", eq.name_markup), format!("${}$", value)]);
    }
    let mut table = builder.build();
    table.with(Style::markdown());
    table.to_string()
}

//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Utils::config::RenderConfig;
    use crate::translator::namespace::Value;
    use crate::translator::pipeline::Translator;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    fn translated() -> Vec<TranslatedEquation> {
        let namespace: HashMap<String, Value> = HashMap::from([("x".to_string(), 5.0.into())]);
        let mut translator = Translator::new(RenderConfig::default(), &namespace);
        translator.translate("q = 2*x + 3\nz = y + 1").unwrap()
    }

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter("warn").unwrap(), LevelFilter::Warn);
        assert_eq!(level_filter(" DEBUG ").unwrap(), LevelFilter::Debug);
        assert_eq!(level_filter("none").unwrap(), LevelFilter::Off);
        assert!(matches!(level_filter("loud"), Err(CalcError::Config(_))));
    }

    #[test]
    fn test_init_logging_tolerates_second_call() {
        assert!(init_logging("off", None).is_ok());
        assert!(init_logging("warn", None).is_ok());
        assert!(init_logging("info", None).is_ok());
        assert!(init_logging("verbose", None).is_err());
    }

    #[test]
    fn test_default_log_name() {
        let name = default_log_name();
        assert!(name.starts_with("log_"));
        assert!(name.ends_with(".txt"));
    }

    #[test]
    fn test_save_markup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.md");
        save_markup_to_file("$$a = 1$$", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "$$a = 1$$\n");
    }

    #[test]
    fn test_save_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        save_equations_to_csv(&translated(), &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "name,expression,value");
        assert_eq!(lines[1], "q,2 x + 3,13");
        assert_eq!(lines[2], "z,y + 1,");
    }

    #[test]
    fn test_markdown_table() {
        let table = equations_to_markdown_table(&translated());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Bezeichnung") && lines[0].contains("Wert"));
        assert!(lines[2].contains("$q$") && lines[2].contains("$13$"));
        assert!(lines[3].contains("$y + 1$"));
    }
}
