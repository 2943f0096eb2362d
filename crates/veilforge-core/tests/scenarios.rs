mod common;

use veilforge_core::engine::{self, capacity};
use veilforge_core::media::frame::FRAME_OVERHEAD;
use veilforge_core::{
    conceal, reveal, Carrier, CarrierFormat, CipherMode, Concealer, LayerSelector, Payload,
    VeilError,
};

use common::*;

#[test]
fn should_hide_hello_world_in_audio_and_only_open_it_with_the_right_password() {
    let options = fast_options();
    let carrier = wav(16000);

    let concealed = conceal(
        &carrier,
        Some("voice.wav"),
        &Payload::text("Hello World!"),
        "p1",
        &options,
    )
    .expect("Failed to hide in audio");
    assert_eq!(concealed.format, CarrierFormat::Wav);

    let revealed = reveal(
        &concealed.carrier,
        None,
        "p1",
        LayerSelector::Latest,
        &options,
    )
    .expect("Failed to unveil from audio");
    assert_eq!(revealed.payload, Payload::text("Hello World!"));

    assert!(matches!(
        reveal(
            &concealed.carrier,
            None,
            "p2",
            LayerSelector::Latest,
            &options
        ),
        Err(VeilError::AuthenticationFailed)
    ));
}

#[test]
fn should_refuse_200_kb_in_a_512_pixel_image_without_touching_it() {
    let options = fast_options();
    let carrier = png(512, 512);

    let result = conceal(
        &carrier,
        Some("photo.png"),
        &Payload::file("archive.bin", vec![0x42; 200 * 1024]),
        "pw",
        &options,
    );
    match result {
        Err(VeilError::CapacityExceeded { required, capacity }) => {
            assert!(required > 200 * 1024);
            assert!(capacity < 511 * 511 * 3 / 8);
        }
        other => panic!("expected a capacity error, got {other:?}"),
    }
}

#[test]
fn should_stack_a_file_and_a_text_in_a_video() {
    let options = fast_options();
    let carrier = y4m(64, 48, 4);

    let first = conceal(
        &carrier,
        None,
        &Payload::file("clip-notes.md", b"# scene 1\n".repeat(10)),
        "pw",
        &options,
    )
    .unwrap();
    let second = conceal(
        &first.carrier,
        None,
        &Payload::text("cut here"),
        "pw",
        &options,
    )
    .unwrap();
    assert_eq!(second.layer_index, 1);

    let listing = engine::layers(&second.carrier, None, &options).unwrap();
    assert_eq!(listing.slots.len(), 2);

    let latest = reveal(&second.carrier, None, "pw", LayerSelector::Latest, &options).unwrap();
    assert_eq!(latest.payload, Payload::text("cut here"));
    assert_eq!(latest.layer_index, 1);
}

#[test]
fn should_fit_a_payload_exactly_at_capacity_and_refuse_one_byte_more() {
    let options = fast_options();
    let carrier = png(64, 64);
    let report = capacity(&carrier, None, &options).unwrap();
    assert_eq!(report.raw_bytes, 63 * 63 * 3 / 8);
    assert_eq!(
        report.capacity_bytes,
        (report.raw_bytes as f64 * 0.9).floor() as usize - FRAME_OVERHEAD
    );

    let max = report.max_payload_len("edge.bin".len(), CipherMode::Aead);
    let exact = conceal(
        &carrier,
        None,
        &Payload::file("edge.bin", vec![1; max]),
        "pw",
        &options,
    )
    .expect("Failed to hide a payload of exactly the capacity");
    assert_eq!(exact.capacity.required_bytes, exact.capacity.capacity_bytes);

    let revealed = reveal(&exact.carrier, None, "pw", LayerSelector::Latest, &options).unwrap();
    assert_eq!(revealed.payload, Payload::file("edge.bin", vec![1; max]));

    assert!(matches!(
        conceal(
            &carrier,
            None,
            &Payload::file("edge.bin", vec![1; max + 1]),
            "pw",
            &options,
        ),
        Err(VeilError::CapacityExceeded { .. })
    ));
}

/// hides the largest payload that fits, then one byte more
fn assert_exact_fit(carrier: &[u8], safety_factor: f64) {
    let options = fast_options();
    let report = capacity(carrier, None, &options).unwrap();
    assert_eq!(
        report.capacity_bytes,
        (report.raw_bytes as f64 * safety_factor).floor() as usize - FRAME_OVERHEAD
    );

    let max = report.max_payload_len("edge.bin".len(), CipherMode::Aead);
    let exact = conceal(
        carrier,
        None,
        &Payload::file("edge.bin", vec![0x5a; max]),
        "pw",
        &options,
    )
    .expect("Failed to hide a payload of exactly the capacity");
    assert_eq!(exact.capacity.required_bytes, exact.capacity.capacity_bytes);

    let revealed = reveal(&exact.carrier, None, "pw", LayerSelector::Latest, &options).unwrap();
    assert_eq!(revealed.payload, Payload::file("edge.bin", vec![0x5a; max]));

    assert!(matches!(
        conceal(
            carrier,
            None,
            &Payload::file("edge.bin", vec![0x5a; max + 1]),
            "pw",
            &options,
        ),
        Err(VeilError::CapacityExceeded { .. })
    ));
}

#[test]
fn should_fit_audio_exactly_at_80_percent_of_its_raw_capacity() {
    assert_exact_fit(&wav(4000), 0.8);
}

#[test]
fn should_fit_video_exactly_at_90_percent_of_its_raw_capacity() {
    assert_exact_fit(&y4m(64, 48, 4), 0.9);
}

#[test]
fn should_reveal_the_same_payload_on_every_call() {
    let options = fast_options();
    let concealed = conceal(&pdf(), None, &Payload::text("stable"), "pw", &options).unwrap();

    let once = reveal(&concealed.carrier, None, "pw", LayerSelector::Latest, &options).unwrap();
    let twice = reveal(&concealed.carrier, None, "pw", LayerSelector::Latest, &options).unwrap();
    assert_eq!(once.payload, twice.payload);
    assert_eq!(once.layer_index, twice.layer_index);
}

#[test]
fn should_produce_fresh_ciphertext_for_the_same_input() {
    let options = fast_options();
    let a = conceal(&pdf(), None, &Payload::text("same"), "pw", &options).unwrap();
    let b = conceal(&pdf(), None, &Payload::text("same"), "pw", &options).unwrap();

    assert_ne!(a.carrier, b.carrier);
}

#[test]
fn should_report_no_hidden_data_in_plain_carriers() {
    let options = fast_options();
    let carriers: Vec<(&str, Vec<u8>)> = vec![
        ("photo.png", png(32, 32)),
        ("photo.bmp", bmp(32, 32)),
        ("voice.wav", wav(4000)),
        ("clip.y4m", y4m(32, 32, 2)),
        ("clip.mp4", mp4()),
        ("report.pdf", pdf()),
        ("letter.docx", docx()),
        ("notes.txt", text(40)),
    ];

    for (name, carrier) in carriers {
        let result = reveal(&carrier, Some(name), "pw", LayerSelector::Latest, &options);
        assert!(
            matches!(result, Err(VeilError::NoHiddenDataFound)),
            "{name}: {result:?}"
        );
    }
}

#[test]
fn should_keep_every_output_a_valid_carrier_of_its_format() {
    let options = fast_options();
    let carriers: Vec<(&str, Vec<u8>, CarrierFormat)> = vec![
        ("photo.png", png(48, 48), CarrierFormat::Png),
        ("photo.bmp", bmp(48, 48), CarrierFormat::Bmp),
        ("voice.wav", wav(16000), CarrierFormat::Wav),
        ("clip.y4m", y4m(48, 48, 2), CarrierFormat::Y4m),
        ("clip.mp4", mp4(), CarrierFormat::Mp4),
        ("report.pdf", pdf(), CarrierFormat::Pdf),
        ("letter.docx", docx(), CarrierFormat::Package),
        ("notes.txt", text(300), CarrierFormat::Text),
    ];

    for (name, carrier, format) in carriers {
        let concealed = conceal(
            &carrier,
            Some(name),
            &Payload::text("kept valid"),
            "pw",
            &options,
        )
        .unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(concealed.format, format);

        let reparsed = Carrier::detect(&concealed.carrier, Some(name), &options)
            .unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(reparsed.format(), format);

        let revealed = reveal(
            &concealed.carrier,
            Some(name),
            "pw",
            LayerSelector::Latest,
            &options,
        )
        .unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(revealed.payload, Payload::text("kept valid"), "{name}");
    }
}

#[test]
fn should_refuse_unknown_carriers() {
    let options = fast_options();

    assert!(matches!(
        conceal(
            &[0u8, 159, 146, 150, 0, 1],
            None,
            &Payload::text("x"),
            "pw",
            &options
        ),
        Err(VeilError::UnsupportedFormat)
    ));
    assert!(matches!(
        conceal(
            &text(300),
            Some("archive.tar"),
            &Payload::text("x"),
            "pw",
            &options
        ),
        Err(VeilError::UnsupportedFormat)
    ));
}

#[test]
fn should_hide_a_metadata_record_in_a_package() {
    let options = fast_options();
    let record = veilforge_core::MetadataRecord::new("Grace")
        .with_copyright_alias("GH")
        .with_timestamp("2024-03-01T12:00:00Z")
        .with_field("license", serde_json::json!("CC-BY-4.0"));

    let concealed = conceal(
        &docx(),
        None,
        &Payload::Record(record.clone()),
        "pw",
        &options,
    )
    .unwrap();
    let revealed = reveal(&concealed.carrier, None, "pw", LayerSelector::Latest, &options).unwrap();

    assert_eq!(revealed.display_name(), "metadata.json");
    assert_eq!(revealed.payload, Payload::Record(record));
}
