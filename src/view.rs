use std::collections::HashMap;
use std::io::Write;

/// The four display regions of the demo page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    PrivateKey,
    PublicKey,
    Cryptogram,
    PlainText,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::PrivateKey,
        Region::PublicKey,
        Region::Cryptogram,
        Region::PlainText,
    ];

    /// Element id the region is bound to.
    pub fn id(self) -> &'static str {
        match self {
            Region::PrivateKey => "private-key",
            Region::PublicKey => "public-key",
            Region::Cryptogram => "cryptogram",
            Region::PlainText => "plain-text",
        }
    }
}

/// User actions; both fire once on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    NewKey,
    Generate,
}

impl Trigger {
    pub fn id(self) -> &'static str {
        match self {
            Trigger::NewKey => "newkey",
            Trigger::Generate => "generate",
        }
    }
}

/// Where the session renders its state.
pub trait View {
    /// Replace the whole content of `region`.
    fn replace(&mut self, region: Region, content: &str);

    fn set_enabled(&mut self, trigger: Trigger, enabled: bool);

    /// Show an inline error; `None` clears it.
    fn show_error(&mut self, message: Option<&str>);
}

/// Keeps rendered state in memory so it can be inspected.
#[derive(Debug, Default, Clone)]
pub struct MemoryView {
    regions: HashMap<Region, String>,
    disabled: Vec<Trigger>,
    error: Option<String>,
    /// Every enable/disable call in order.
    pub trigger_log: Vec<(Trigger, bool)>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Region content, empty if never written.
    pub fn content(&self, region: Region) -> &str {
        self.regions.get(&region).map(String::as_str).unwrap_or("")
    }

    pub fn is_enabled(&self, trigger: Trigger) -> bool {
        !self.disabled.contains(&trigger)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl View for MemoryView {
    fn replace(&mut self, region: Region, content: &str) {
        self.regions.insert(region, content.to_string());
    }

    fn set_enabled(&mut self, trigger: Trigger, enabled: bool) {
        self.disabled.retain(|t| *t != trigger);
        if !enabled {
            self.disabled.push(trigger);
        }
        self.trigger_log.push((trigger, enabled));
    }

    fn show_error(&mut self, message: Option<&str>) {
        self.error = message.map(str::to_string);
    }
}

/// Writes each region update to a terminal-like sink as a titled block.
pub struct TerminalView<W: Write> {
    out: W,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TerminalView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> View for TerminalView<W> {
    fn replace(&mut self, region: Region, content: &str) {
        if content.is_empty() {
            return;
        }
        if let Err(e) = writeln!(self.out, "== #{} ==\n{}\n", region.id(), content.trim_end()) {
            tracing::warn!("failed to render #{}: {}", region.id(), e);
        }
    }

    fn set_enabled(&mut self, trigger: Trigger, enabled: bool) {
        tracing::debug!(trigger = trigger.id(), enabled, "trigger state changed");
    }

    fn show_error(&mut self, message: Option<&str>) {
        if let Some(message) = message {
            if let Err(e) = writeln!(self.out, "!! {}\n", message) {
                tracing::warn!("failed to render error: {}", e);
            }
        }
    }
}
