use gvariant_check::{
    language::parser::parse_type,
    lint::{load_checker, run_check, CheckSettings},
    tools::diagnostics::{emit_syntax_error, report_io_error},
};
use std::{
    env,
    path::{Path, PathBuf},
    process,
};

const USAGE: &str = "Usage: gvariant-check check <calls.toml> [--config <path>] [--target <triple>] [--watch]\n       gvariant-check suggest <C type> [--config <path>] [--target <triple>]";

struct CommandLine {
    positional: Vec<String>,
    settings: CheckSettings,
    watch: bool,
}

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();

    let Some((command, rest)) = args.split_first() else {
        usage_error("missing command");
    };
    let cli = parse_options(rest);

    match command.as_str() {
        "check" => check(cli),
        "suggest" => suggest(cli),
        other => usage_error(&format!("unknown command `{other}`")),
    }
}

fn check(cli: CommandLine) {
    let [file] = cli.positional.as_slice() else {
        usage_error("`check` takes exactly one calls file");
    };
    let path = PathBuf::from(file);
    if let Err(err) = std::fs::metadata(&path) {
        report_io_error(&path, &err);
        process::exit(2);
    }
    match run_check(&path, &cli.settings, cli.watch) {
        Ok(summary) if summary.has_errors() => process::exit(1),
        Ok(_) => {}
        Err(err) => {
            eprintln!("gvariant-check: {err}");
            process::exit(2);
        }
    }
}

fn suggest(cli: CommandLine) {
    if cli.positional.is_empty() {
        usage_error("`suggest` needs a C type");
    }
    let spelling = cli.positional.join(" ");
    let ty = match parse_type(&spelling) {
        Ok(ty) => ty,
        Err(err) => {
            emit_syntax_error("<type>", &spelling, err);
            process::exit(2);
        }
    };
    let checker = match load_checker(Path::new("."), &cli.settings) {
        Ok(checker) => checker,
        Err(err) => {
            eprintln!("gvariant-check: {err}");
            process::exit(2);
        }
    };
    match checker.format_string_for_type(&ty) {
        Some(format) => println!("{format}"),
        None => {
            eprintln!("no GVariant format string represents `{ty}`");
            process::exit(1);
        }
    }
}

fn parse_options(args: &[String]) -> CommandLine {
    let mut cli = CommandLine {
        positional: Vec::new(),
        settings: CheckSettings::default(),
        watch: false,
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--watch" => cli.watch = true,
            "--config" => match iter.next() {
                Some(path) => cli.settings.config = Some(PathBuf::from(path)),
                None => usage_error("`--config` needs a path"),
            },
            "--target" => match iter.next() {
                Some(triple) => cli.settings.target = Some(triple.clone()),
                None => usage_error("`--target` needs a target triple"),
            },
            flag if flag.starts_with("--") => usage_error(&format!("unknown option `{flag}`")),
            _ => cli.positional.push(arg.clone()),
        }
    }
    cli
}

fn usage_error(message: &str) -> ! {
    eprintln!("gvariant-check: {message}\n{USAGE}");
    process::exit(2);
}
