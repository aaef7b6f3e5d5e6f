use hl7tree_core::{
    control::{restore_control_chars, visible_control_chars},
    levels::LevelTable,
    schema::{SchemaCatalog, SchemaSpec},
    value::{FieldData, FieldValue, SemanticType},
};
use hl7tree_parser::{
    ElementId, ErrorCode, FramingOptions, ParseContext, Segment, TextLayout, parse, parse_all,
};

fn xyz_tables() -> (SchemaCatalog, LevelTable) {
    let s = |code: &str| SchemaSpec::leaf(code, SemanticType::String);
    let catalog = SchemaCatalog::new([
        SchemaSpec::composite("MSH", vec![s("segment"), s("encoding_chars")]),
        SchemaSpec::composite(
            "XYZ",
            vec![
                s("segment"),
                SchemaSpec::leaf("id", SemanticType::Number),
                SchemaSpec::composite("parts", vec![s("a"), s("b"), s("c")]),
            ],
        ),
        SchemaSpec::composite("SUB", vec![s("segment"), s("name")]),
        SchemaSpec::composite("NTE", vec![s("segment"), s("comment")]),
    ])
    .unwrap();
    let levels = LevelTable::from_levels([("MSH", 1), ("XYZ", 1), ("SUB", 2)]).unwrap();
    (catalog, levels)
}

#[test]
fn test_components_of_second_field() {
    let (catalog, levels) = xyz_tables();
    let ctx = ParseContext::new(&catalog, &levels);

    let message = parse("MSH|^&~\\\rXYZ|1|A^B^C", &ctx).unwrap();

    let xyz = message.find("XYZ").unwrap().segment().unwrap();
    let parts = xyz.field("parts").unwrap();
    let values: Vec<Option<&FieldValue>> = parts.children().iter().map(|c| c.value()).collect();
    assert_eq!(
        values,
        vec![
            Some(&FieldValue::from("A")),
            Some(&FieldValue::from("B")),
            Some(&FieldValue::from("C")),
        ]
    );
    assert_eq!(parts.to_text(), "A^B^C");
}

#[test]
fn test_sibling_and_child_levels() {
    let (catalog, levels) = xyz_tables();
    let ctx = ParseContext::new(&catalog, &levels);

    let source = "MSH|^&~\\\rXYZ|1\rSUB|a\rSUB|b\rNTE|about b\rXYZ|2\rSUB|c";
    let message = parse(source, &ctx).unwrap();

    let root = message.root();
    let codes: Vec<&str> = root.children().map(|e| e.code()).collect();
    assert_eq!(codes, vec!["MSH", "XYZ", "XYZ"]);

    let first = root.nth_child_with_code("XYZ", 0).unwrap();
    assert_eq!(first.children().count(), 2);
    let second_sub = first.nth_child_with_code("SUB", 1).unwrap();
    assert_eq!(second_sub.note().as_deref(), Some("NTE|about b"));
    assert_eq!(second_sub.parent().unwrap().id(), first.id());

    assert_eq!(message.to_text_with(TextLayout::AsParsed), source);
    assert_eq!(
        message.to_text(),
        "MSH|^&~\\\rXYZ|1|^^\rSUB|a\rSUB|b\rNTE|about b\rXYZ|2|^^\rSUB|c"
    );
}

#[test]
fn test_short_lines_are_written_in_full() {
    let s = |code: &str| SchemaSpec::leaf(code, SemanticType::String);
    let catalog = SchemaCatalog::new([
        SchemaSpec::composite("MSH", vec![s("segment"), s("encoding_chars")]),
        SchemaSpec::composite(
            "XYZ",
            vec![
                s("segment"),
                SchemaSpec::leaf("id", SemanticType::Number),
                SchemaSpec::composite("parts", vec![s("a"), s("b"), s("c")]),
                SchemaSpec::leaf("when", SemanticType::Timestamp),
            ],
        ),
    ])
    .unwrap();
    let levels = LevelTable::from_levels([("MSH", 1), ("XYZ", 1)]).unwrap();
    let ctx = ParseContext::new(&catalog, &levels);

    let message = parse("MSH|^~\\&\rXYZ|1|A", &ctx).unwrap();
    let xyz = message.find("XYZ").unwrap().segment().unwrap();
    assert_eq!(xyz.to_text(), "XYZ|1|A^^|");
    assert_eq!(xyz.to_text_with(TextLayout::AsParsed), "XYZ|1|A");

    let data = FieldData::map([("segment", FieldData::from("XYZ")), ("id", FieldData::from(1.0))]);
    let (built, warnings) =
        Segment::from_mapping("XYZ", &data, &message.delimiters(), &catalog).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(built.to_text(), "XYZ|1|^^|");
    assert_eq!(built.field("parts").unwrap().to_text(), "^^");
}

#[test]
fn test_partial_update_through_mapping() {
    let (catalog, levels) = xyz_tables();
    let ctx = ParseContext::new(&catalog, &levels);
    let mut message = parse("MSH|^&~\\\rXYZ|1|A^B^C", &ctx).unwrap();
    let id = message.find("XYZ").unwrap().id();

    let segment = message.segment_mut(id).unwrap();
    segment
        .set_mapping(&FieldData::map([(
            "parts",
            FieldData::map([("a", FieldData::from("Z")), ("c", FieldData::null())]),
        )]))
        .unwrap();

    assert_eq!(segment.to_text(), "XYZ|1|Z^B^");
    assert_eq!(message.to_text(), "MSH|^&~\\\rXYZ|1|Z^B^");
}

#[test]
fn test_unknown_path_is_reported() {
    let (catalog, levels) = xyz_tables();
    let ctx = ParseContext::new(&catalog, &levels);
    let mut message = parse("MSH|^&~\\\rXYZ|1", &ctx).unwrap();
    let id = message.find("XYZ").unwrap().id();

    let err = message
        .segment_mut(id)
        .unwrap()
        .set_value("parts.d", "x")
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::E202));
    assert!(message.segment_mut(ElementId::ROOT).is_none());
}

#[test]
fn test_block_framed_blob() {
    let blob = "\x0bMSH|^~\\&|A||||||ADT^A01\rPID|1||100\r\x1c\r\
                \x0bMSH|^~\\&|B||||||ADT^A08\rPID|1||200\r\x1c\r";

    let messages = parse_all(blob, &ParseContext::builtin()).unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].event_code(), Some("A01"));
    assert_eq!(messages[1].event_code(), Some("A08"));
    assert_eq!(
        messages[1].to_text_with(TextLayout::AsParsed),
        "MSH|^~\\&|B||||||ADT^A08\rPID|1||200"
    );
}

#[test]
fn test_framing_options() {
    let source = "MSH|^~\\&\nPID|1";
    let ctx = ParseContext::builtin().with_framing(FramingOptions::new('\r', false, true));

    // Without the line feed fallback the whole text is one header line
    let message = parse(source, &ctx).unwrap();
    assert_eq!(message.len(), 1);
}

#[test]
fn test_structure_error_labels() {
    let source = "MSH|^~\\&\rOBX|1\rORC|RE";

    let err = parse(source, &ParseContext::builtin()).unwrap_err();

    let diagnostic = &err.diagnostics()[0];
    assert_eq!(diagnostic.code(), Some(ErrorCode::E200));
    let spans: Vec<&str> = diagnostic
        .labels()
        .iter()
        .map(|label| &source[label.span().start()..label.span().end()])
        .collect();
    assert_eq!(spans, vec!["ORC|RE", "OBX|1"]);
}

#[test]
fn test_visible_control_chars_round_trip() {
    let source = "MSH|^~\\&\rPID|1";
    let message = parse(source, &ParseContext::builtin()).unwrap();

    let shown = visible_control_chars(&message.to_text_with(TextLayout::AsParsed));
    assert_eq!(shown, "MSH|^~\\&<CR>\rPID|1");
    assert_eq!(restore_control_chars(&shown), source);
}

#[test]
fn test_staff_master_file_message() {
    let source = "MSH|^~\\&|HRIS||||||MFN^M02\r\
                  MFI|PRA^Practitioner master file^HL70175||UPD|||AL\r\
                  MFE|MAD|U2246|200202150930|PMF98123789182^^PLW\r\
                  STF|PMF98123789182^^PLW|U2246^^^PLW|HIPPOCRATES^HAROLD^H|P|M|19511004\r\
                  PRA|PMF98123789182^^PLW||I|Y|OB/GYN^^L\r\
                  ZPS|1|GHH";

    let message = parse(source, &ParseContext::builtin()).unwrap();

    let codes: Vec<&str> = message.root().children().map(|e| e.code()).collect();
    assert_eq!(codes, vec!["MSH", "MFI", "MFE", "STF", "PRA", "ZPS"]);

    let stf = message.find("STF").unwrap().segment().unwrap();
    assert_eq!(stf.field_path("staff_name.given_name").unwrap().to_text(), "HAROLD");
    assert!(stf.field("dob").unwrap().value().and_then(FieldValue::as_date).is_some());

    let mfe = message.find("MFE").unwrap().segment().unwrap();
    let effective = mfe.field("effective_dttm").unwrap().value();
    assert!(effective.and_then(FieldValue::as_timestamp).is_some());
    assert_eq!(message.to_text_with(TextLayout::AsParsed), source);
}
