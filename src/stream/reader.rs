use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::Path;
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Features,
    Done,
}

/// Forward-only reader over the `features` array of a GeoJSON FeatureCollection.
///
/// Each call to `next` parses exactly one feature from the underlying reader,
/// so memory is bounded by the largest single feature. Other top-level members
/// (`type`, `name`, `crs`, ...) are skipped without being materialized. The
/// sequence can only be restarted by opening the source again.
pub struct FeatureReader<R, T = geojson::Feature> {
    reader: R,
    state: State,
    index: usize,
    _item: PhantomData<T>,
}

impl<T: DeserializeOwned> FeatureReader<BufReader<File>, T> {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        debug!(path = %path.display(), "Opened feature collection");
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead, T: DeserializeOwned> FeatureReader<R, T> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            state: State::Start,
            index: 0,
            _item: PhantomData,
        }
    }

    fn peek(&mut self) -> Result<Option<u8>> {
        Ok(self.reader.fill_buf()?.first().copied())
    }

    fn skip_whitespace(&mut self) -> Result<()> {
        loop {
            let buf = self.reader.fill_buf()?;
            let available = buf.len();
            if available == 0 {
                return Ok(());
            }
            let ws = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
            self.reader.consume(ws);
            if ws < available {
                return Ok(());
            }
        }
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        self.skip_whitespace()?;
        match self.peek()? {
            Some(b) if b == expected => {
                self.reader.consume(1);
                Ok(())
            }
            Some(b) => bail!(
                "expected '{}' but found '{}'",
                expected as char,
                b as char
            ),
            None => bail!("expected '{}' but reached end of input", expected as char),
        }
    }

    fn parse<V: DeserializeOwned>(&mut self) -> Result<V> {
        let mut de = serde_json::Deserializer::from_reader(&mut self.reader);
        Ok(V::deserialize(&mut de)?)
    }

    /// Skips one JSON value. Numbers are consumed by hand because the JSON
    /// parser needs one byte of lookahead to terminate them, which would be
    /// lost when the per-value parser is dropped.
    fn skip_value(&mut self) -> Result<()> {
        self.skip_whitespace()?;
        match self.peek()? {
            Some(b) if b == b'-' || b.is_ascii_digit() => loop {
                let buf = self.reader.fill_buf()?;
                let available = buf.len();
                let n = buf
                    .iter()
                    .take_while(|&&b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'))
                    .count();
                self.reader.consume(n);
                if available == 0 || n < available {
                    return Ok(());
                }
            },
            _ => {
                self.parse::<IgnoredAny>()?;
                Ok(())
            }
        }
    }

    /// Positions the reader just inside the `features` array.
    fn seek_features(&mut self) -> Result<()> {
        if self.reader.fill_buf()?.starts_with(UTF8_BOM) {
            self.reader.consume(UTF8_BOM.len());
        }
        self.expect_byte(b'{')?;

        let mut first = true;
        loop {
            self.skip_whitespace()?;
            if self.peek()? == Some(b'}') {
                bail!("feature collection has no \"features\" member");
            }
            if !first {
                self.expect_byte(b',')?;
                self.skip_whitespace()?;
            }
            first = false;

            let key: String = self.parse()?;
            self.expect_byte(b':')?;
            if key == "features" {
                self.expect_byte(b'[')?;
                return Ok(());
            }
            self.skip_value()
                .with_context(|| format!("malformed top-level member \"{key}\""))?;
        }
    }

    /// Skips the members after `features` and checks the document is closed
    /// with nothing but whitespace after it.
    fn finish_document(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace()?;
            if self.peek()? == Some(b'}') {
                self.reader.consume(1);
                break;
            }
            self.expect_byte(b',')?;
            self.skip_whitespace()?;
            let key: String = self.parse()?;
            self.expect_byte(b':')?;
            self.skip_value()
                .with_context(|| format!("malformed top-level member \"{key}\""))?;
        }

        self.skip_whitespace()?;
        if let Some(b) = self.peek()? {
            bail!("unexpected '{}' after feature collection", b as char);
        }
        Ok(())
    }

    fn next_feature(&mut self) -> Result<Option<T>> {
        if self.state == State::Start {
            self.seek_features()?;
            self.state = State::Features;
        }

        self.skip_whitespace()?;
        if self.peek()? == Some(b']') {
            self.reader.consume(1);
            self.state = State::Done;
            self.finish_document()?;
            return Ok(None);
        }
        if self.index > 0 {
            self.expect_byte(b',')?;
        }

        let feature = self.parse()?;
        self.index += 1;
        Ok(Some(feature))
    }
}

impl<R: BufRead, T: DeserializeOwned> Iterator for FeatureReader<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Done {
            return None;
        }
        match self.next_feature() {
            Ok(Some(feature)) => Some(Ok(feature)),
            Ok(None) => None,
            Err(e) => {
                self.state = State::Done;
                let index = self.index;
                Some(Err(e.context(format!("failed to read feature {index}"))))
            }
        }
    }
}

/// Counts the features in a collection without keeping any of them.
pub fn count_features(path: &Path) -> Result<usize> {
    let reader: FeatureReader<_, IgnoredAny> = FeatureReader::open(path)?;
    let mut count = 0;
    for feature in reader {
        feature?;
        count += 1;
    }
    Ok(count)
}
