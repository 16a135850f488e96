//! Test data builders for creating telemetry lines

/// Builder for CSV telemetry streams
pub struct StreamBuilder {
    bytes: Vec<u8>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Append a header line
    pub fn header(mut self, names: &[&str]) -> Self {
        self.bytes.extend_from_slice(names.join(",").as_bytes());
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    /// Append a data row
    pub fn row(mut self, values: &[f64]) -> Self {
        let fields: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.bytes.extend_from_slice(fields.join(",").as_bytes());
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    /// Append `count` rows of `width` columns; x is the row number
    pub fn ramp(mut self, count: usize, width: usize) -> Self {
        for i in 0..count {
            let values: Vec<f64> = (0..width).map(|c| (i * c) as f64).collect();
            self = self.row(&values);
        }
        self
    }

    /// Append an arbitrary line
    pub fn line(mut self, text: &str) -> Self {
        self.bytes.extend_from_slice(text.as_bytes());
        self.bytes.extend_from_slice(b"\n");
        self
    }

    /// Append raw bytes without a terminator
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

impl Default for StreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_builder() {
        let bytes = StreamBuilder::new()
            .header(&["t", "a"])
            .row(&[0.0, 1.5])
            .build();

        assert_eq!(bytes, b"t,a\r\n0,1.5\r\n");
    }
}
