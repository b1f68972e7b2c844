/// Machine form: whitespace removed, upper-cased.
pub fn electronic_format(address: &str) -> String {
    address
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Human form: electronic form split into groups of four.
pub fn print_format(address: &str) -> String {
    let electronic = electronic_format(address);
    let chars: Vec<char> = electronic.chars().collect();
    chars
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}
