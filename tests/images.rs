mod common;

use std::path::PathBuf;

use docxide_html::model::ImageFormat;
use docxide_html::{DefaultImageLoader, Document, HtmlRenderer, RenderConfig};

const EMU_PER_PX: i64 = 9525;

#[test]
fn width_attribute_keeps_aspect_ratio() {
    let uri = common::png_data_uri(200, 50);
    let doc = common::render(&format!("<p><img src='{uri}' width='100'></p>"));
    let drawings = common::drawings(&doc);
    assert_eq!(drawings.len(), 1);
    assert_eq!(drawings[0].width_emu, 100 * EMU_PER_PX);
    assert_eq!(drawings[0].height_emu, 25 * EMU_PER_PX);
}

#[test]
fn both_dimensions_are_used_as_given() {
    let uri = common::png_data_uri(200, 50);
    let doc = common::render(&format!(
        "<p><img src='{uri}' style='width:1in;height:1in'></p>"
    ));
    let d = common::drawings(&doc)[0];
    assert_eq!((d.width_emu, d.height_emu), (914_400, 914_400));
}

#[test]
fn natural_size_is_fitted_to_the_page() {
    let uri = common::png_data_uri(2000, 100);
    let doc = common::render(&format!("<img src='{uri}'>"));
    let d = common::drawings(&doc)[0];
    // 6.5in text column
    assert_eq!(d.width_emu, 9360 * 635);
    assert_eq!(d.height_emu, 297_180);
}

#[test]
fn small_images_keep_their_natural_size() {
    let uri = common::png_data_uri(40, 30);
    let doc = common::render(&format!("<p>a<img src='{uri}' alt='dot'>b</p>"));
    let d = common::drawings(&doc)[0];
    assert_eq!((d.width_emu, d.height_emu), (40 * EMU_PER_PX, 30 * EMU_PER_PX));
    assert_eq!(d.name, "dot");
    assert_eq!(common::texts(&doc), vec!["ab"]);
}

#[test]
fn max_width_limits_declared_width() {
    let uri = common::png_data_uri(100, 100);
    let doc = common::render(&format!(
        "<img src='{uri}' style='width:400px;max-width:200px'>"
    ));
    let d = common::drawings(&doc)[0];
    assert_eq!(d.width_emu, 200 * EMU_PER_PX);
    assert_eq!(d.height_emu, 200 * EMU_PER_PX);
}

#[test]
fn unloadable_images_are_skipped() {
    let doc = common::render(
        "<p>before<img src='data:image/png;base64,AAAA'>\
         <img src='https://example.com/x.png'><img>after</p>",
    );
    assert!(common::drawings(&doc).is_empty());
    assert!(doc.media().is_empty());
    assert_eq!(common::texts(&doc), vec!["beforeafter"]);
}

#[test]
fn inline_svg_is_embedded() {
    let doc = common::render(
        "<p><svg width='40' height='20'>\
         <rect width='40' height='20' fill='red'/></svg></p>",
    );
    let d = common::drawings(&doc)[0];
    assert_eq!((d.width_emu, d.height_emu), (40 * EMU_PER_PX, 20 * EMU_PER_PX));
    assert_eq!(doc.media()[0].format, ImageFormat::Svg);
    assert!(String::from_utf8_lossy(&doc.media()[0].data).contains("<rect"));
}

#[test]
fn relative_paths_resolve_against_base_dir() {
    let dir = std::env::temp_dir().join(format!("docxide-html-images-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("pic.png"), common::png(10, 20)).unwrap();

    let renderer = HtmlRenderer::new(RenderConfig::default())
        .with_image_loader(DefaultImageLoader::with_base_dir(PathBuf::from(&dir)));
    let mut doc = Document::default();
    renderer
        .render_html(&mut doc, "<p><img src='pic.png'></p>")
        .unwrap();
    std::fs::remove_dir_all(&dir).ok();

    let d = common::drawings(&doc)[0];
    assert_eq!(d.name, "pic.png");
    assert_eq!((d.width_emu, d.height_emu), (10 * EMU_PER_PX, 20 * EMU_PER_PX));
}
