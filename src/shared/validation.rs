/// Extensions accepted for vehicle and gallery pictures
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Lowercased extension of a client-supplied file name, dot included.
///
/// Only the final path component is considered. Names without a dot, names
/// whose only dot is leading (`.bashrc`) and names ending in a dot have no
/// extension.
pub fn file_extension(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem_len = base.trim_start_matches('.').len();
    let base = &base[base.len() - stem_len..];

    let dot = base.rfind('.')?;
    let ext = &base[dot..];
    if ext.len() <= 1 {
        return None;
    }
    Some(ext.to_lowercase())
}

pub fn has_image_extension(file_name: &str) -> bool {
    file_extension(file_name)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}
