use std::env::args_os;

use chanpack::{pack_channels_to_tga, CLIParser};

fn main() {
    let mut cli_parser = CLIParser::default();
    let arguments = cli_parser.parse(args_os());
    match pack_channels_to_tga(&arguments) {
        Ok(_) => println!("Packing successful"),
        Err(e) => eprintln!("Packing failed because of: {}", e),
    }
}
