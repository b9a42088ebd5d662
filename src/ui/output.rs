use crate::image::Image;
use crate::ui::{palette, Icons, Palette};

pub fn header(text: &str) {
    println!("{} {}", Icons::CONTAINER, Palette::paint(palette().heading, text));
}

pub fn image_header(image: &Image) {
    println!(
        "{} {} {}",
        Icons::CONTAINER,
        Palette::paint(palette().image_id, &image.short_id),
        dim(&image.tag_names().join(", "))
    );
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, Palette::paint(palette().ok, label));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, Palette::paint(palette().alert, label));
}

pub fn info(label: &str, value: &str) {
    println!("{} {}: {}", Icons::INFO, dim(label), value);
}

pub fn not_found(what: &str) {
    println!("{} {}", Icons::EMPTY, dim(&format!("No image found for {what}")));
}

pub fn section(title: &str) {
    println!();
    println!("{}", Palette::paint(palette().heading, title));
}

pub fn dim(text: &str) -> String {
    Palette::paint(palette().muted, text)
}

pub fn tag(text: &str) -> String {
    Palette::paint(palette().tag, text)
}

pub fn label(text: &str) -> String {
    Palette::paint(palette().label, text)
}

pub fn volume(text: &str) -> String {
    Palette::paint(palette().volume, text)
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", dim(label), value);
}
