#[ctor::ctor]
fn init() {
    use log4rs;
    log4rs::init_file("log4rs.yaml", Default::default()).unwrap();
}

pub fn log_file_block(name: &str, content: &[u8]) {
    fn get_byte_array(bytes: &[u8]) -> Vec<String> {
        bytes.iter().map(|byte| format!("{:02X}", byte)).collect()
    }
    log::info!("{}\n{:?}", name, get_byte_array(content));
}
