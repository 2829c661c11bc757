//! Command-line settings parsing: a small short-option parser that mutates
//! a context's settings.

use std::fs::File;

use crate::context::Context;
use crate::report::Output;
use crate::{ColorMode, Verbosity};

// File tag used on parse error messages.
const TAG: &str = "parse_args()";

fn print_usage(program: &str) {
    println!("Usage: {program} [options]");
    println!("Options:");
    println!("  -v               Verbose output.");
    println!("  -m               Minimal output.");
    println!("  -s               Silent output.");
    println!("  -c <auto|on|off> Colored output.");
    println!("  -o <file>        Output file.");
    println!("  -h               Print this message and exit.");
    println!("treetest version: {}", env!("CARGO_PKG_VERSION"));
}

impl Context {
    /// Reads the settings from command-line arguments.
    ///
    /// `args` must include the program name as first element, as
    /// `std::env::args()` yields it. Recognized options:
    ///
    /// * `-v` / `-m` / `-s` — verbose, minimal, or silent output;
    /// * `-c <auto|on|off>` — colored output;
    /// * `-o <file>` — write messages to `file`;
    /// * `-h` — print a usage message on the standard output and interrupt
    ///   the test.
    ///
    /// Short options can be grouped (`-svcon`), and parsing stops at `--` or
    /// at the first non-option argument. Missing or invalid arguments are
    /// reported as errors, which aborts the parsing and cancels the rest of
    /// the test sequence.
    pub fn parse_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let program = args
            .first()
            .map(String::as_str)
            .unwrap_or(env!("CARGO_PKG_NAME"))
            .to_string();

        let mut i = 1;
        'args: while i < args.len() {
            let Some(opts) = args[i].strip_prefix('-') else {
                break;
            };
            if opts.is_empty() || opts == "-" {
                break;
            }

            for (pos, opt) in opts.char_indices() {
                match opt {
                    'v' => self.set_verbosity(Verbosity::VERBOSE),
                    'm' => self.set_verbosity(Verbosity::MINIMAL),
                    's' => self.set_verbosity(Verbosity::SILENT),
                    'c' | 'o' => {
                        // The option argument is either the rest of the
                        // group or the next argument.
                        let rest = &opts[pos + opt.len_utf8()..];
                        let value = if !rest.is_empty() {
                            rest.to_string()
                        } else {
                            i += 1;
                            match args.get(i) {
                                Some(value) => value.clone(),
                                None => {
                                    let text = format!("Missing argument for option '{opt}'.");
                                    self.message_at(Verbosity::ERROR, Some(TAG), 0, &text);
                                    return;
                                }
                            }
                        };
                        match opt {
                            'c' => match value.as_str() {
                                "auto" => self.set_color(ColorMode::Auto),
                                "on" => self.set_color(ColorMode::On),
                                "off" => self.set_color(ColorMode::Off),
                                _ => {
                                    let text =
                                        format!("Invalid argument for option 'c': '{value}'.");
                                    self.message_at(Verbosity::ERROR, Some(TAG), 0, &text);
                                    return;
                                }
                            },
                            _ => match File::create(&value) {
                                Ok(file) => self.set_output(Output::file(file)),
                                Err(_) => {
                                    let text = format!("Could not open file: '{value}'.");
                                    self.message_at(Verbosity::ERROR, Some(TAG), 0, &text);
                                    return;
                                }
                            },
                        }
                        i += 1;
                        continue 'args;
                    }
                    'h' => {
                        print_usage(&program);
                        self.interrupt();
                    }
                    _ => {
                        let text = format!("Invalid option: '{opt}'.");
                        self.message_at(Verbosity::ERROR, Some(TAG), 0, &text);
                        return;
                    }
                }
            }
            i += 1;
        }
    }
}
