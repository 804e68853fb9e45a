use radextract_core::error::RadExtractError;
use radextract_core::export;
use radextract_core::extraction::ReportExtractor;
use radextract_core::pipeline::BatchProgress;
use radextract_core::process_csv;
use radextract_core::workflow::{View, Workflow};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::output::table;
use crate::ServiceArgs;

const HELP: &str = "\
Commands:
  new <KEY_ID> [ORDER_ID]  enter report text, end with a line containing only '.'
  demo                     extract the bundled example chest X-ray (key EX-10023)
  save                     accept the extraction under review and enter the next report
  discard                  drop the extraction under review
  finish                   save any pending extraction and show the session summary
  resume                   leave the summary to enter more reports
  load <FILE.csv>          extract a PatientID,OrderID,Report_Text batch into the session
  show                     show the current review or summary
  export [FILE]            write the pivoted CSV export
  reset                    clear the whole session
  help                     show this help
  quit                     leave (the session is not kept)";

const DEMO_KEY_ID: &str = "EX-10023";
const DEMO_REPORT: &str = "\
CHEST X-RAY PA/LATERAL
Lungs: Focal consolidation in RLL. Heart size is normal.
Impression: RLL Pneumonia.";

pub fn run(service: &ServiceArgs) -> Result<(), RadExtractError> {
    let extractor = super::build_extractor(service)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_loop(&mut stdin.lock(), &mut stdout.lock(), &extractor)
}

/// Drive a [`Workflow`] from line-oriented commands until `quit` or EOF.
///
/// Command errors, including unreadable or unwritable files, are printed
/// and the loop continues. Only failing to read or write the terminal
/// itself ends the session.
pub fn run_loop<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    extractor: &dyn ReportExtractor,
) -> Result<(), RadExtractError> {
    let mut workflow = Workflow::new();
    writeln!(out, "{HELP}\n")?;

    loop {
        write!(out, "[{}] > ", workflow.view())?;
        out.flush()?;

        let Some(line) = read_line(input)? else {
            break;
        };
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let args: Vec<&str> = words.collect();

        let result = match command {
            "new" => new_report(&mut workflow, &args, input, out, extractor),
            "demo" => submit_report(&mut workflow, DEMO_KEY_ID, "", DEMO_REPORT, out, extractor),
            "save" => workflow.save_and_next().and_then(|_| {
                writeln!(out, "Saved. {} report(s) in session.", workflow.session().len())?;
                Ok(())
            }),
            "discard" => workflow.discard().and_then(|_| {
                writeln!(out, "Extraction discarded.")?;
                Ok(())
            }),
            "finish" => {
                workflow.finish();
                show(&workflow, out)
            }
            "resume" => workflow.resume(),
            "load" => load_batch(&mut workflow, &args, out, extractor),
            "show" => show(&workflow, out),
            "export" => export_session(&workflow, &args, out),
            "reset" => reset(&mut workflow, input, out),
            "help" => writeln!(out, "{HELP}").map_err(RadExtractError::from),
            "quit" | "exit" => break,
            other => writeln!(out, "Unknown command '{other}'. Type 'help' for commands.")
                .map_err(RadExtractError::from),
        };

        if let Err(e) = result {
            writeln!(out, "Error: {e}")?;
        }
    }

    Ok(())
}

fn new_report<R: BufRead, W: Write>(
    workflow: &mut Workflow,
    args: &[&str],
    input: &mut R,
    out: &mut W,
    extractor: &dyn ReportExtractor,
) -> Result<(), RadExtractError> {
    // read the body before any check so its lines never run as commands
    writeln!(out, "Paste the report text, then a line with only '.':")?;
    let mut text = String::new();
    while let Some(line) = read_line(input)? {
        if line.trim() == "." {
            break;
        }
        text.push_str(&line);
        text.push('\n');
    }

    let key_id = args.first().copied().unwrap_or("");
    let order_id = args.get(1).copied().unwrap_or("");
    submit_report(workflow, key_id, order_id, text.trim_end(), out, extractor)
}

fn submit_report<W: Write>(
    workflow: &mut Workflow,
    key_id: &str,
    order_id: &str,
    text: &str,
    out: &mut W,
    extractor: &dyn ReportExtractor,
) -> Result<(), RadExtractError> {
    let record = workflow.submit(key_id, order_id, text, extractor)?;
    write!(out, "{}", table::format_review(record))?;
    writeln!(out, "'save' to keep it and enter the next report, 'finish' to keep it and see the summary, 'discard' to drop it.")?;
    Ok(())
}

fn load_batch<W: Write>(
    workflow: &mut Workflow,
    args: &[&str],
    out: &mut W,
    extractor: &dyn ReportExtractor,
) -> Result<(), RadExtractError> {
    let Some(path) = args.first() else {
        writeln!(out, "Usage: load <FILE.csv>")?;
        return Ok(());
    };
    if workflow.view() == View::Review {
        writeln!(out, "Save or discard the extraction under review first.")?;
        return Ok(());
    }

    let csv_text = std::fs::read_to_string(path)?;
    let progress: &dyn Fn(BatchProgress) = &super::print_progress;
    let outcome = process_csv(&csv_text, extractor, Some(progress))?;
    write!(out, "{}", table::format_batch_report(&outcome))?;

    workflow.ingest_batch(outcome)?;
    show(workflow, out)
}

fn show<W: Write>(workflow: &Workflow, out: &mut W) -> Result<(), RadExtractError> {
    match (workflow.view(), workflow.draft()) {
        (View::Review, Some(record)) => write!(out, "{}", table::format_review(record))?,
        (View::Summary, _) => write!(out, "{}", table::format_summary(workflow.session().records()))?,
        _ => writeln!(
            out,
            "{} report(s) in session. Use 'new <KEY_ID>' to enter a report.",
            workflow.session().len()
        )?,
    }
    Ok(())
}

fn export_session<W: Write>(
    workflow: &Workflow,
    args: &[&str],
    out: &mut W,
) -> Result<(), RadExtractError> {
    let records = workflow.session().records();
    if records.is_empty() {
        writeln!(out, "Session is empty, nothing to export.")?;
        return Ok(());
    }

    let path = match args.first() {
        Some(file) => {
            let path = PathBuf::from(*file);
            std::fs::write(&path, export::render(records)?)?;
            path
        }
        None => export::write_export(
            Path::new("."),
            records,
            chrono::Utc::now().timestamp_millis(),
        )?,
    };
    writeln!(out, "Exported {} record(s) to {}", records.len(), path.display())?;
    Ok(())
}

fn reset<R: BufRead, W: Write>(
    workflow: &mut Workflow,
    input: &mut R,
    out: &mut W,
) -> Result<(), RadExtractError> {
    write!(
        out,
        "Clear this session? All {} report(s) will be lost. [y/N] ",
        workflow.session().len()
    )?;
    out.flush()?;

    let answer = read_line(input)?.unwrap_or_default();
    if answer.trim().eq_ignore_ascii_case("y") || answer.trim().eq_ignore_ascii_case("yes") {
        workflow.reset();
        writeln!(out, "Session cleared.")?;
    } else {
        writeln!(out, "Kept the session.")?;
    }
    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>, RadExtractError> {
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string()))
}
