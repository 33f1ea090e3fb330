//! Fixed candidate captions and roast templates, per language.
//!
//! These are compile-time constants, never derived at runtime. The winning
//! caption is always one of the ten list entries verbatim; the template has a
//! single `{caption}` slot.

/// Number of candidate captions per language.
pub const CAPTION_COUNT: usize = 10;

/// Supported caption languages.
///
/// Selection is strict: exactly `"es"` picks Spanish, any other tag falls
/// back to English.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Spanish,
}

impl Language {
    /// Resolve a request language tag. English is the universal fallback.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "es" => Language::Spanish,
            _ => Language::English,
        }
    }
}

/// A language's candidate captions plus its roast sentence template.
pub struct CaptionSet {
    captions: [&'static str; CAPTION_COUNT],
    template: &'static str,
}

const ENGLISH: CaptionSet = CaptionSet {
    captions: [
        "a generic selfie",
        "someone trying to look cool",
        "a person posing with questionable fashion sense",
        "an attempt at being an influencer",
        "a low-quality snapshot",
        "a profile picture",
        "someone in nature",
        "an adorable pet",
        "delicious food",
        "a meme",
    ],
    template: "The image appears to be of {caption}. Based on this, the subject \
               might be a bit predictable or trying too hard.",
};

const SPANISH: CaptionSet = CaptionSet {
    captions: [
        "un selfie genérico",
        "alguien intentando parecer guay",
        "una persona posando con un sentido de la moda cuestionable",
        "un intento de ser influencer",
        "una instantánea de baja calidad",
        "una foto de perfil",
        "alguien en la naturaleza",
        "una mascota adorable",
        "comida deliciosa",
        "un meme",
    ],
    template: "La imagen parece ser de {caption}. Basándonos en esto, el sujeto \
               podría ser un poco predecible o estar esforzándose demasiado.",
};

impl CaptionSet {
    /// The caption set for a language.
    pub fn for_language(language: Language) -> &'static CaptionSet {
        match language {
            Language::English => &ENGLISH,
            Language::Spanish => &SPANISH,
        }
    }

    /// All candidate captions, in scoring order.
    pub fn captions(&self) -> &[&'static str; CAPTION_COUNT] {
        &self.captions
    }

    /// Render the roast sentence for the caption at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= CAPTION_COUNT`; callers obtain the index from an
    /// argmax over the caption scores, which has the same length.
    pub fn render(&self, index: usize) -> String {
        self.template.replacen("{caption}", self.captions[index], 1)
    }
}
