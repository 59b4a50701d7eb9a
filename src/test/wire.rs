use crate::TagType;

/// Builds raw wire documents for tests. This specifically does *not*
/// guarantee the resulting bytes are a valid document; corrupt documents
/// are useful for testing.
pub struct Wire {
    payload: Vec<u8>,
}

impl Wire {
    pub fn new() -> Self {
        Wire {
            payload: Vec::new(),
        }
    }

    pub fn tag(mut self, t: TagType) -> Self {
        self.payload.push(t.id());
        self
    }

    /// An arbitrary type byte, for unknown-tag tests.
    pub fn raw_tag(mut self, b: u8) -> Self {
        self.payload.push(b);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.payload
            .extend_from_slice(&(name.len() as u16).to_be_bytes());
        self.payload.extend_from_slice(name.as_bytes());
        self
    }

    pub fn start_compound(self, name: &str) -> Self {
        self.tag(TagType::Compound).name(name)
    }

    pub fn end_compound(self) -> Self {
        self.tag(TagType::End)
    }

    pub fn start_list(self, name: &str, element: TagType, count: u32) -> Self {
        self.tag(TagType::List)
            .name(name)
            .tag(element)
            .u32_payload(count)
    }

    pub fn int(self, name: &str, v: i32) -> Self {
        self.tag(TagType::Int).name(name).int_payload(v)
    }

    pub fn string(self, name: &str, v: &str) -> Self {
        self.tag(TagType::String).name(name).string_payload(v)
    }

    pub fn int_payload(mut self, v: i32) -> Self {
        self.payload.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn u32_payload(mut self, v: u32) -> Self {
        self.payload.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn string_payload(mut self, s: &str) -> Self {
        self.payload
            .extend_from_slice(&(s.len() as u16).to_be_bytes());
        self.payload.extend_from_slice(s.as_bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.payload
    }
}
