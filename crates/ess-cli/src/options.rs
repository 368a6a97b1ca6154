/// Decoder flags shared by every subcommand, and their mapping onto
/// [`DecoderConfig`].
///
/// ```text
/// ┌──────────────────────┬──────────────────────────────────────────────────┐
/// │ Flag                 │ DecoderConfig field                              │
/// ├──────────────────────┼──────────────────────────────────────────────────┤
/// │ --known TES3,GLOB    │ recognized (`*` accepts every tag)               │
/// │ --strict             │ strictness = Strict                              │
/// │ --layout P:T=L       │ layouts.set(Some(P), T, L); `*:T=L` for any P    │
/// │ --max-record-size N  │ max_record_size                                  │
/// └──────────────────────┴──────────────────────────────────────────────────┘
/// ```
use anyhow::{Context, Result, anyhow, bail};
use ess_decoder::config::DEFAULT_MAX_RECORD_SIZE;
use ess_decoder::{DecoderConfig, RecognizedTags, Strictness};
use ess_types::{LayoutRegistry, PayloadLayout};
use ess_wire::Tag;

#[derive(clap::Args, Clone, Debug)]
pub struct DecodeOptions {
    /// Comma-separated top-level record tags to decode; the walk stops at
    /// the first record outside this set. `*` decodes every record.
    #[arg(long, default_value = "TES3,GLOB")]
    pub known: String,

    /// Treat subrecord layout mismatches (e.g. a short HEDR) as errors.
    #[arg(long)]
    pub strict: bool,

    /// Override a subrecord layout, as `PARENT:TAG=LAYOUT`. Layouts are
    /// `file-header`, `text`, `integer`, `float`, `opaque`. Repeatable.
    #[arg(long = "layout", value_name = "P:T=L")]
    pub layouts: Vec<String>,

    /// Reject records whose declared body exceeds this many bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_RECORD_SIZE)]
    pub max_record_size: u32,
}

impl DecodeOptions {
    /// Build the decoder configuration these flags describe.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed tag list or layout override.
    pub fn config(&self) -> Result<DecoderConfig> {
        let mut layouts = LayoutRegistry::new();
        for entry in &self.layouts {
            let (parent, tag, layout) =
                parse_layout(entry).with_context(|| format!("invalid --layout {entry:?}"))?;
            layouts.set(parent, tag, layout);
        }

        Ok(DecoderConfig::default()
            .with_recognized(parse_known(&self.known).context("invalid --known")?)
            .with_strictness(if self.strict {
                Strictness::Strict
            } else {
                Strictness::Lenient
            })
            .with_layouts(layouts)
            .with_max_record_size(self.max_record_size))
    }
}

fn parse_tag(text: &str) -> Result<Tag> {
    Tag::parse(text).ok_or_else(|| anyhow!("{text:?} is not a 4-character tag"))
}

/// `*` or a comma-separated list of tags.
fn parse_known(text: &str) -> Result<RecognizedTags> {
    if text.trim() == "*" {
        return Ok(RecognizedTags::Any);
    }
    let tags = text
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(parse_tag)
        .collect::<Result<Vec<_>>>()?;
    if tags.is_empty() {
        bail!("no tags given");
    }
    Ok(RecognizedTags::only(tags))
}

/// `PARENT:TAG=LAYOUT`, where `PARENT` may be `*`.
fn parse_layout(text: &str) -> Result<(Option<Tag>, Tag, PayloadLayout)> {
    let (key, layout) = text
        .split_once('=')
        .ok_or_else(|| anyhow!("expected PARENT:TAG=LAYOUT"))?;
    let (parent, tag) = key
        .split_once(':')
        .ok_or_else(|| anyhow!("expected PARENT:TAG=LAYOUT"))?;

    let parent = match parent {
        "*" => None,
        p => Some(parse_tag(p)?),
    };
    let layout =
        PayloadLayout::from_name(layout).ok_or_else(|| anyhow!("unknown layout {layout:?}"))?;
    Ok((parent, parse_tag(tag)?, layout))
}
