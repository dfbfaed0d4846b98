//! Read-boundary invariance: however the body is cut into reads, the same
//! lines, events and final text come out.

use bytes::Bytes;
use cue_stream::{NullSink, SseLines, StreamRenderer, drive_stream};
use futures::executor::block_on;
use futures::stream;
use proptest::prelude::*;
use proptest::sample::Index;
use std::convert::Infallible;
use std::time::Instant;

fn sse_body(texts: &[String], with_done: bool) -> Vec<u8> {
    let mut body = String::new();
    for text in texts {
        let record = serde_json::json!({ "chunk": text });
        body.push_str(&format!("data: {record}\n\n"));
    }
    if with_done {
        body.push_str("data: {\"done\": true, \"model\": \"gpt-4o\", \"ttft\": 0.4}\n\n");
    }
    body.into_bytes()
}

fn cut(body: &[u8], cuts: &[Index]) -> Vec<Bytes> {
    let mut points: Vec<usize> = cuts.iter().map(|i| i.index(body.len() + 1)).collect();
    points.push(0);
    points.push(body.len());
    points.sort_unstable();
    points.dedup();
    points
        .windows(2)
        .map(|w| Bytes::copy_from_slice(&body[w[0]..w[1]]))
        .collect()
}

fn lines_of(reads: &[Bytes]) -> Vec<String> {
    let mut splitter = SseLines::new();
    let mut out = Vec::new();
    for read in reads {
        out.extend(splitter.feed(read));
    }
    out.extend(splitter.finish());
    out
}

fn arb_texts() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z é€😀*`#\n]{1,12}", 1..8)
}

proptest! {
    #[test]
    fn lines_do_not_depend_on_read_boundaries(
        texts in arb_texts(),
        cuts in prop::collection::vec(any::<Index>(), 0..12),
    ) {
        let body = sse_body(&texts, true);
        let whole = lines_of(&[Bytes::from(body.clone())]);
        let split = lines_of(&cut(&body, &cuts));
        prop_assert_eq!(whole, split);
    }

    #[test]
    fn rendered_text_does_not_depend_on_read_boundaries(
        texts in arb_texts(),
        cuts in prop::collection::vec(any::<Index>(), 0..12),
        with_done in any::<bool>(),
    ) {
        let body = sse_body(&texts, with_done);
        let reads: Vec<Result<Bytes, Infallible>> =
            cut(&body, &cuts).into_iter().map(Ok).collect();
        let renderer = StreamRenderer::new("gpt-4o", Instant::now());
        let report = block_on(drive_stream(stream::iter(reads), renderer, NullSink))
            .expect("stream has content");
        prop_assert_eq!(report.raw, texts.concat());
        prop_assert_eq!(report.model.is_some(), with_done);
    }

    #[test]
    fn single_byte_reads_match_whole_body(texts in arb_texts()) {
        let body = sse_body(&texts, true);
        let bytewise: Vec<Bytes> = body.iter().map(|b| Bytes::copy_from_slice(&[*b])).collect();
        prop_assert_eq!(lines_of(&bytewise), lines_of(&[Bytes::from(body)]));
    }
}
