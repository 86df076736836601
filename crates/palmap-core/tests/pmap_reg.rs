//! PMAP regression test
//!
//! Encodes the fixture rasters, checks the text against golden files,
//! and decodes it back.

use palmap_core::{Color, Palette, PmapDocument, Raster, decode_pmap, encode_pmap};
use palmap_test::{RegParams, fixture_raster};

#[test]
fn pmap_reg_encode() {
    let mut rp = RegParams::new("pmap_encode");

    let quad = fixture_raster("quad").unwrap();
    let text = encode_pmap(&quad, &Palette::extract(&quad));
    rp.compare_strings(
        b"3\n#FF0000 2 0;0 0;1\n#00FF00 1 1;0\n#0000FF 1 1;1",
        text.as_bytes(),
    );
    rp.write_data_and_check(text.as_bytes(), "pmap").unwrap();

    let stripes = fixture_raster("stripes").unwrap();
    let doc = PmapDocument::encode(&stripes, &Palette::extract(&stripes));
    rp.compare_values(4.0, doc.len() as f64, 0.0);
    for entry in doc.entries() {
        rp.compare_values(8.0, entry.positions.len() as f64, 0.0);
    }
    rp.write_data_and_check(&doc.write_to_bytes().unwrap(), "pmap")
        .unwrap();

    assert!(rp.cleanup());
}

#[test]
fn pmap_reg_round_trip() {
    let mut rp = RegParams::new("pmap_round_trip");

    for name in ["quad", "stripes", "gradient"] {
        let raster = fixture_raster(name).unwrap();
        let palette = Palette::extract(&raster);
        let (decoded_palette, decoded) = decode_pmap(&encode_pmap(&raster, &palette)).unwrap();
        rp.compare_values(palette.len() as f64, decoded_palette.len() as f64, 0.0);
        rp.compare_rasters(&raster, &decoded);
    }

    assert!(rp.cleanup());
}

#[test]
fn pmap_reg_alpha_is_dropped() {
    let mut rp = RegParams::new("pmap_alpha");

    let raster = fixture_raster("alpha").unwrap();
    let palette = Palette::extract(&raster);
    rp.compare_values(3.0, palette.len() as f64, 0.0);

    let text = encode_pmap(&raster, &palette);
    rp.compare_strings(b"2\n#FF0000 2 0;0 1;0\n#000000 1 2;0", text.as_bytes());

    let (decoded_palette, decoded) = decode_pmap(&text).unwrap();
    assert_eq!(
        decoded_palette.colors(),
        &[Color::rgb(255, 0, 0), Color::BLACK]
    );
    let expected = Raster::from_pixels(
        3,
        1,
        vec![Color::rgb(255, 0, 0), Color::rgb(255, 0, 0), Color::BLACK],
    )
    .unwrap();
    rp.compare_rasters(&expected, &decoded);

    assert!(rp.cleanup());
}

#[test]
fn pmap_reg_file_io() {
    let mut rp = RegParams::new("pmap_file");

    let raster = fixture_raster("stripes").unwrap();
    let doc = PmapDocument::encode(&raster, &Palette::extract(&raster));
    let path = palmap_test::regout_path("pmap_file.pmap");
    doc.write_to_file(&path).unwrap();

    let read = PmapDocument::read_from_file(&path).unwrap();
    rp.compare_strings(doc.to_text().as_bytes(), read.to_text().as_bytes());
    rp.compare_rasters(&raster, &read.render().unwrap());

    assert!(rp.cleanup());
}
