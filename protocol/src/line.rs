//! Tokenizer for the simulator's pipe-delimited protocol lines

/// Keyword arguments collected from trailing `[key] value` fields.
///
/// Entries keep their on-wire order. Unknown keys are preserved but carry no
/// meaning; handlers consult the keys they care about through the typed
/// accessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KwArgs {
    entries: Vec<(String, String)>,
}

impl KwArgs {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `[from]` effect label, when present.
    pub fn from_effect(&self) -> Option<&str> {
        self.get("from")
    }

    /// The `[of]` subject token, when present.
    pub fn of_subject(&self) -> Option<&str> {
        self.get("of")
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn push_front(&mut self, key: String, value: String) {
        self.entries.insert(0, (key, value));
    }
}

/// One tokenized protocol line.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLine {
    pub command: String,
    pub args: Vec<String>,
    pub kwargs: KwArgs,
}

/// Tokenize a single protocol line.
///
/// Returns `None` for lines that do not start with `|`. Trailing fields of
/// the form `[key] value` are popped from the end of the positional
/// arguments into the keyword bag in reverse order, stopping at the first
/// trailing field that does not start with `[`.
pub fn tokenize(line: &str) -> Option<ProtocolLine> {
    let rest = line.strip_prefix('|')?;
    let mut fields = rest.split('|');
    let command = fields.next().unwrap_or("").to_string();
    let mut args: Vec<String> = fields.map(|s| s.to_string()).collect();

    let mut kwargs = KwArgs::default();
    while let Some(last) = args.last() {
        let Some((key, value)) = split_kwarg(last) else {
            break;
        };
        kwargs.push_front(key, value);
        args.pop();
    }

    Some(ProtocolLine {
        command,
        args,
        kwargs,
    })
}

/// Split a `[key] value` field. A `[` with no closing `]` is malformed and
/// stays positional.
fn split_kwarg(field: &str) -> Option<(String, String)> {
    let body = field.strip_prefix('[')?;
    let (key, value) = body.split_once(']')?;
    Some((key.to_string(), value.trim_start().to_string()))
}
