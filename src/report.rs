pub fn banner(host: &str, start_port: u16, end_port: u16, threads: usize) -> String {
    format!(
        "Scanning {} from port {} to {} using {} threads...\n",
        host, start_port, end_port, threads
    )
}

/// One line listing `open` (expected ascending) or stating that the
/// range had nothing open.
pub fn render(host: &str, start_port: u16, end_port: u16, open: &[u16]) -> String {
    if open.is_empty() {
        return format!(
            "No open ports found on {} in the range {}-{}.\n",
            host, start_port, end_port
        );
    }

    let ports = open
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    format!("Open ports on {}: {}\n", host, ports)
}
