use crate::Arguments;
use clap::{
    arg, crate_authors, crate_description, crate_name, crate_version, value_parser, Arg,
    ArgMatches, Command,
};
use std::ffi::OsString;
use std::path::PathBuf;

const DEFAULT_OUTPUT_FILE: &str = "packed.tga";

pub struct CLIParser {
    command: Command,
}

impl CLIParser {
    pub fn new() -> Self {
        let command = Self::create_base_command();
        let command = Self::register_arguments(command);
        CLIParser { command }
    }

    pub fn parse<I, T>(&mut self, itr: I) -> Arguments
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .command
            .try_get_matches_from_mut(itr)
            .unwrap_or_else(|e| e.exit());
        Self::extract_arguments(&matches)
    }

    fn register_arguments(command: Command) -> Command {
        let command = Self::register_red_file_argument(command);
        let command = Self::register_green_file_argument(command);
        let command = Self::register_blue_file_argument(command);
        Self::register_output_file_argument(command)
    }

    fn register_red_file_argument(command: Command) -> Command {
        command.arg(Self::create_red_file_argument())
    }

    fn register_green_file_argument(command: Command) -> Command {
        command.arg(Self::create_green_file_argument())
    }

    fn register_blue_file_argument(command: Command) -> Command {
        command.arg(Self::create_blue_file_argument())
    }

    fn register_output_file_argument(command: Command) -> Command {
        command.arg(Self::create_output_file_argument())
    }

    fn create_base_command() -> Command {
        Command::new(crate_name!())
            .version(crate_version!())
            .author(crate_authors!())
            .about(crate_description!())
    }

    fn create_red_file_argument() -> Arg {
        Arg::new("red_file")
            .help("Image supplying the red channel")
            .value_parser(value_parser!(PathBuf))
            .required(true)
    }

    fn create_green_file_argument() -> Arg {
        Arg::new("green_file")
            .help("Image supplying the green channel")
            .value_parser(value_parser!(PathBuf))
            .required(true)
    }

    fn create_blue_file_argument() -> Arg {
        Arg::new("blue_file")
            .help("Image supplying the blue channel")
            .value_parser(value_parser!(PathBuf))
            .required(true)
    }

    fn create_output_file_argument() -> Arg {
        arg!(output_file: -o --output <FILE> "Output filename")
            .default_value(DEFAULT_OUTPUT_FILE)
            .value_parser(value_parser!(PathBuf))
    }

    fn extract_arguments(matches: &ArgMatches) -> Arguments {
        Arguments {
            red_file: Self::extract_red_file_argument(matches),
            green_file: Self::extract_green_file_argument(matches),
            blue_file: Self::extract_blue_file_argument(matches),
            output_file: Self::extract_output_file_argument(matches),
        }
    }

    fn extract_red_file_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("red_file")
            .expect("Required argument red_file not provided")
            .clone()
    }

    fn extract_green_file_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("green_file")
            .expect("Required argument green_file not provided")
            .clone()
    }

    fn extract_blue_file_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("blue_file")
            .expect("Required argument blue_file not provided")
            .clone()
    }

    fn extract_output_file_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("output_file")
            .expect("Output file must have a value because of its default")
            .clone()
    }
}

impl Default for CLIParser {
    fn default() -> Self {
        Self::new()
    }
}
