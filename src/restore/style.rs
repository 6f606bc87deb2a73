//! Restoration styles and their fixed prompt / label tables

use serde::{Deserialize, Serialize};

/// One of the three restoration presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestorationStyle {
    Conservative,
    Modern,
    Balanced,
}

const CONSERVATIVE_PROMPT: &str = "Please restore this old damaged photograph with a CONSERVATIVE approach. Create a high-quality restored version that:

- Removes scratches, tears, and physical damage carefully
- Fixes fading and improves color saturation moderately
- Enhances clarity and sharpness subtly
- Corrects discoloration while preserving vintage character
- Maintains the original composition and authentic feel
- Results in a naturally restored photograph with vintage charm
- Keeps the original mood and atmosphere
- Ensures natural and realistic skin tones, avoiding artificial or overly desaturated appearances

Generate the conservatively restored image.";

const MODERN_PROMPT: &str = "Please restore this old damaged photograph with a MODERN approach. Create a high-quality restored version that:

- Removes all scratches, tears, and physical damage completely
- Naturally enhances color saturation while maintaining realistic tones
- Improves clarity and sharpness appropriately without over-processing
- Applies balanced modern color grading with natural contemporary colors
- Brightens the image moderately while preserving natural skin tones
- Creates a fresh and clear appearance without oversaturation
- Results in a professionally enhanced photograph with realistic colors
- The human appearance should remain natural and lifelike
- Avoids overly vibrant or artificial-looking colors
- Maintains color harmony and natural balance
- Prioritize accurate and diverse skin tone representation, ensuring they appear healthy, natural, and free from undesirable color casts
- The overall color balance should complement natural skin tones

Generate the modernly enhanced image with natural and balanced colors.";

const BALANCED_PROMPT: &str = "Please restore this old damaged photograph with a BALANCED HYBRID approach that combines the best of vintage and modern techniques. Create a high-quality restored version that:

- Removes all scratches, tears, and physical damage completely
- Preserves the warm, nostalgic character of vintage photography while adding modern clarity
- Enhances colors naturally - not too muted like pure vintage, not too vibrant like pure modern
- Applies a harmonious blend of vintage warmth and modern sharpness
- Maintains authentic skin tones with a subtle warm undertone that feels both classic and contemporary
- Creates depth and dimension while preserving the original emotional atmosphere
- Results in a timeless photograph that feels both nostalgic and fresh
- Balances the sepia/warm tones of vintage with the clarity and detail of modern processing
- The final image should feel like a perfectly preserved memory - clear enough to see every detail, warm enough to evoke nostalgia
- Ensures the restoration honors both the historical character and modern viewing expectations
- Creates a sophisticated, museum-quality restoration that bridges past and present

Generate the balanced hybrid restored image that perfectly combines vintage warmth with modern clarity.";

impl RestorationStyle {
    pub const ALL: [RestorationStyle; 3] = [
        RestorationStyle::Conservative,
        RestorationStyle::Modern,
        RestorationStyle::Balanced,
    ];

    /// Wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            RestorationStyle::Conservative => "conservative",
            RestorationStyle::Modern => "modern",
            RestorationStyle::Balanced => "balanced",
        }
    }

    /// Exact, case-sensitive match against the wire identifiers
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.as_str() == value)
    }

    /// Instruction text sent to the model
    pub fn prompt(&self) -> &'static str {
        match self {
            RestorationStyle::Conservative => CONSERVATIVE_PROMPT,
            RestorationStyle::Modern => MODERN_PROMPT,
            RestorationStyle::Balanced => BALANCED_PROMPT,
        }
    }

    /// Display label used in summary messages
    pub fn label(&self) -> &'static str {
        match self {
            RestorationStyle::Conservative => "빈티지 보존",
            RestorationStyle::Modern => "모던 향상",
            RestorationStyle::Balanced => "하이브리드",
        }
    }

    /// Description used when the model returns no caption
    pub fn fallback_description(&self) -> String {
        format!("{} 스타일로 복원된 이미지", self.as_str())
    }
}

impl std::fmt::Display for RestorationStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join style labels with ", "
pub fn join_labels<'a, I>(styles: I) -> String
where
    I: IntoIterator<Item = &'a RestorationStyle>,
{
    styles
        .into_iter()
        .map(RestorationStyle::label)
        .collect::<Vec<_>>()
        .join(", ")
}
