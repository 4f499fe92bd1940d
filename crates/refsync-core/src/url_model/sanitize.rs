//! Make a decoded path segment safe to use as a single filename.

/// Replaces characters that would escape or corrupt a single path component.
///
/// - `/`, `\`, NUL and control characters become `_`
/// - Length is limited to 255 bytes (Linux NAME_MAX), cut on a char boundary
///
/// Spaces and dots are kept so decoded names stay recognizable.
pub fn sanitize_path_component(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let out: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == '\0' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if out.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !out.is_char_boundary(take) {
            take -= 1;
        }
        out[..take].to_string()
    } else {
        out
    }
}
