//! Conversion pipeline tests: streaming intake, cancellation, JSON dumps,
//! warnings and statistics.

use pdf2markdown::{
    convert_json, convert_tokens, BBox, CancellationToken, ConvertOptions, Converter, Error,
    PageTokens, Pdf2Markdown, Result, Token, TokenSource, Unit, Warning,
};

fn words(text: &str, x0: f32, y1: f32, size: f32) -> Vec<Token> {
    let mut x = x0;
    text.split(' ')
        .map(|w| {
            let width = w.chars().count() as f32 * size * 0.5;
            let token = Token::new(w, BBox::new(x, y1 - size, x + width, y1), "Times", size);
            x += width + size * 0.3;
            token
        })
        .collect()
}

fn text_page(index: usize, text: &str) -> PageTokens {
    PageTokens::new(index, words(text, 72.0, 120.0, 12.0)).with_size(612.0, 792.0)
}

/// Yields pages from a queue, optionally cancelling after the first one.
struct QueueSource {
    pages: Vec<PageTokens>,
    cancel_after_first: Option<CancellationToken>,
    yielded: usize,
}

impl QueueSource {
    fn new(pages: Vec<PageTokens>) -> Self {
        Self {
            pages,
            cancel_after_first: None,
            yielded: 0,
        }
    }

    fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_after_first = Some(token);
        self
    }
}

impl TokenSource for QueueSource {
    fn next_page(&mut self) -> Option<Result<PageTokens>> {
        if self.yielded == 1 {
            if let Some(token) = &self.cancel_after_first {
                token.cancel();
            }
        }
        if self.pages.is_empty() {
            return None;
        }
        self.yielded += 1;
        Some(Ok(self.pages.remove(0)))
    }
}

#[test]
fn test_stream_out_of_order_pages() {
    let pages = vec![
        text_page(2, "Third page text."),
        text_page(0, "First page text."),
        text_page(1, "Second page text."),
    ];

    for options in [ConvertOptions::new(), ConvertOptions::sequential()] {
        let result = Converter::new(options)
            .unwrap()
            .convert_source(QueueSource::new(pages.clone()))
            .unwrap();
        assert_eq!(
            result.markdown,
            "First page text.\n\nSecond page text.\n\nThird page text.\n"
        );
        assert_eq!(result.stats.page_count, 3);
    }
}

#[test]
fn test_stream_cancelled_midway() {
    let pages: Vec<PageTokens> = (0..4).map(|i| text_page(i, "Some page text.")).collect();

    for parallel in [true, false] {
        let token = CancellationToken::new();
        let options = ConvertOptions::new()
            .with_parallel(parallel)
            .with_cancellation(token.clone());
        let source = QueueSource::new(pages.clone()).cancelling(token);
        let result = Converter::new(options).unwrap().convert_source(source);
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}

#[test]
fn test_stream_error_stops_conversion() {
    let source = vec![
        Ok(text_page(0, "Fine.")),
        Err(Error::TokenSource {
            page: 1,
            message: "extractor crashed".into(),
        }),
    ]
    .into_iter();

    let result = Pdf2Markdown::new().convert_source(source);
    match result {
        Err(Error::TokenSource { page, message }) => {
            assert_eq!(page, 1);
            assert_eq!(message, "extractor crashed");
        }
        other => panic!("expected a token source error, got {:?}", other.map(|r| r.markdown)),
    }
}

#[test]
fn test_json_page_dump() {
    let json = r#"[
        {"index": 1, "width": 612, "height": 792, "tokens": [
            {"text": "Later", "bbox": {"x0": 72, "y0": 108, "x1": 102, "y1": 120},
             "font_family": "Times", "font_size": 12}
        ]},
        {"index": 0, "tokens": [
            {"text": "Earlier", "bbox": {"x0": 72, "y0": 108, "x1": 114, "y1": 120},
             "font_family": "Times", "font_size": 12}
        ]}
    ]"#;

    let result = convert_json(json).unwrap();
    assert_eq!(result.markdown, "Earlier\n\nLater\n");
}

#[test]
fn test_json_flat_token_dump_groups_pages() {
    let json = r#"[
        {"text": "B", "bbox": {"x0": 72, "y0": 108, "x1": 78, "y1": 120},
         "font_family": "Times", "font_size": 12, "page": 1},
        {"text": "A", "bbox": {"x0": 72, "y0": 108, "x1": 78, "y1": 120},
         "font_family": "Times", "font_size": 12}
    ]"#;

    let result = convert_json(json).unwrap();
    assert_eq!(result.markdown, "A\n\nB\n");
    assert_eq!(result.stats.page_count, 2);
}

#[test]
fn test_flat_tokens_keep_page_assignment() {
    let mut tokens: Vec<Token> = words("On page two.", 72.0, 120.0, 12.0)
        .into_iter()
        .map(|t| t.on_page(1))
        .collect();
    tokens.extend(words("On page one.", 72.0, 120.0, 12.0));

    let result = convert_tokens(tokens).unwrap();
    assert_eq!(result.markdown, "On page one.\n\nOn page two.\n");
}

#[test]
fn test_malformed_tokens_reported_and_skipped() {
    let mut tokens = words("Visible text", 72.0, 120.0, 12.0);
    tokens.push(Token::new("ghost", BBox::new(90.0, 120.0, 90.0, 120.0), "Times", 12.0));
    tokens.push(Token::new("nan", BBox::new(f32::NAN, 100.0, 120.0, 112.0), "Times", 12.0));

    let result = pdf2markdown::convert(vec![PageTokens::new(0, tokens)]).unwrap();
    assert_eq!(result.markdown, "Visible text\n");
    assert_eq!(
        result.warnings,
        vec![Warning::MalformedTokens { page: 0, count: 2 }]
    );
    assert_eq!(result.stats.malformed_tokens, 2);
}

#[test]
fn test_empty_pages_counted() {
    let pages = vec![
        PageTokens::new(0, vec![]),
        text_page(1, "Only this page has text."),
        PageTokens::new(2, vec![]),
    ];

    let result = pdf2markdown::convert(pages).unwrap();
    assert_eq!(result.markdown, "Only this page has text.\n");
    assert_eq!(result.stats.page_count, 3);
    assert_eq!(result.stats.empty_pages, 2);
    assert_eq!(result.document.page_count, 3);
}

#[test]
fn test_stats_count_units() {
    let mut tokens = words("Overview", 72.0, 90.0, 20.0);
    tokens.extend(words("A short introduction.", 72.0, 130.0, 11.0));
    tokens.extend(words("1. first step", 72.0, 170.0, 11.0));
    tokens.extend(words("2. second step", 72.0, 184.0, 11.0));

    let result = pdf2markdown::convert(vec![PageTokens::new(0, tokens)]).unwrap();
    assert_eq!(
        result.markdown,
        "# Overview\n\nA short introduction.\n\n1. first step\n2. second step\n"
    );
    let stats = &result.stats;
    assert_eq!(stats.heading_count, 1);
    assert_eq!(stats.paragraph_count, 1);
    assert_eq!(stats.list_count, 1);
    assert_eq!(stats.list_item_count, 2);
    assert!(matches!(result.document.units[2], Unit::List(ref l) if l.is_ordered()));
}

#[test]
fn test_document_json_round_trip_shape() {
    let result = pdf2markdown::convert(vec![text_page(0, "Plain text.")]).unwrap();
    let json = pdf2markdown::render::to_json(&result.document, pdf2markdown::JsonFormat::Compact)
        .unwrap();
    assert!(json.contains(r#""type":"paragraph""#));
    assert!(json.contains("Plain text."));
}
