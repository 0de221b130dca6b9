use crate::{
    analysis, ElementKind, Grammar, GrammarError, ProductionPattern, ProductionPatternElement,
    TokenPattern, EOF_TOKEN,
};
use std::fmt::Write;

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch literal and regular expression matching to case insensitive mode.
    /// The mode has to be chosen before the grammar is prepared.
    pub fn set_case_insensitive(&mut self, case_insensitive: bool) -> Result<(), String> {
        if self.prepared.get().is_some() {
            return Err("The grammar is already prepared.".to_string());
        }
        self.case_insensitive = case_insensitive;
        Ok(())
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Add a token pattern declaration.
    /// Token ids have to be unique; id 0 is reserved for the end of input.
    pub fn add_token_pattern(&mut self, pattern: TokenPattern) -> Result<(), String> {
        if self.prepared.get().is_some() {
            return Err("The grammar is already prepared.".to_string());
        }
        if let Some(existing) = self.token_ids.get(&pattern.id()) {
            return Err(format!(
                "Token id {} is already used by '{}'.",
                pattern.id(),
                self.token_patterns[*existing].name()
            ));
        }
        self.token_ids.insert(pattern.id(), self.token_patterns.len());
        self.token_patterns.push(pattern);
        Ok(())
    }

    /// Add a production pattern declaration.
    /// The first production added becomes the start production of the grammar.
    pub fn add_production_pattern(&mut self, pattern: ProductionPattern) -> Result<(), String> {
        if self.prepared.get().is_some() {
            return Err("The grammar is already prepared.".to_string());
        }
        if let Some(existing) = self.production_ids.get(&pattern.id()) {
            return Err(format!(
                "Production id {} is already used by '{}'.",
                pattern.id(),
                self.production_patterns[*existing].name()
            ));
        }
        self.production_ids
            .insert(pattern.id(), self.production_patterns.len());
        self.production_patterns.push(pattern);
        Ok(())
    }

    /// Validate the grammar and compute its lookahead tables.
    ///
    /// All detected problems are returned together.
    /// After the first success the grammar is frozen and further calls are a no-op.
    pub fn prepare(&self) -> Result<(), Vec<GrammarError>> {
        if self.prepared.get().is_some() {
            return Ok(());
        }
        let depth = analysis::prepare(self)?;
        let _ = self.lookahead_depth.set(depth);
        let _ = self.prepared.set(());
        Ok(())
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared.get().is_some()
    }

    /// The lookahead depth chosen while the grammar was prepared.
    pub fn lookahead_depth(&self) -> Option<usize> {
        self.lookahead_depth.get().copied()
    }

    pub fn token_pattern(&self, id: usize) -> Option<&TokenPattern> {
        self.token_ids.get(&id).map(|index| &self.token_patterns[*index])
    }

    pub fn production_pattern(&self, id: usize) -> Option<&ProductionPattern> {
        self.production_ids
            .get(&id)
            .map(|index| &self.production_patterns[*index])
    }

    pub fn token_patterns(&self) -> &[TokenPattern] {
        &self.token_patterns
    }

    pub fn production_patterns(&self) -> &[ProductionPattern] {
        &self.production_patterns
    }

    /// The production parsing starts from, which is the first one added.
    pub fn start_production(&self) -> Option<&ProductionPattern> {
        self.production_patterns.first()
    }

    /// A display name for a token id, used in listings and error messages.
    pub(crate) fn token_description(&self, id: usize) -> String {
        if id == EOF_TOKEN {
            return "<end of input>".to_string();
        }
        match self.token_pattern(id) {
            Some(pattern) => pattern.name().to_string(),
            None => format!("<token {}>", id),
        }
    }

    /// Write a human readable listing of all production rules and token patterns.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut writer = String::new();
        for production in &self.production_patterns {
            writeln!(writer, "{}", production.name())?;
            for (index, alternative) in production.alternatives().iter().enumerate() {
                let separator = if index == 0 { ':' } else { '|' };
                write!(writer, "{:>6}", separator)?;
                if alternative.elements().is_empty() {
                    write!(writer, " <empty>")?;
                }
                for element in alternative.elements() {
                    write!(writer, " {}", self.render_element(element))?;
                }
                writeln!(writer)?;
            }
            writeln!(writer, "{:>6}", ';')?;
            writeln!(writer)?;
        }
        writeln!(writer, "tokens {{")?;
        for pattern in &self.token_patterns {
            writeln!(writer, "{:>6}{} ,", "", pattern)?;
        }
        writeln!(writer, "}}")?;
        Ok(writer)
    }

    fn render_element(&self, element: &ProductionPatternElement) -> String {
        let name = match element.kind() {
            ElementKind::Token => self.token_description(element.id()),
            ElementKind::Production => match self.production_pattern(element.id()) {
                Some(production) => production.name().to_string(),
                None => format!("<production {}>", element.id()),
            },
        };
        match (element.min(), element.max()) {
            (1, Some(1)) => name,
            (0, Some(1)) => format!("{}?", name),
            (0, None) => format!("{}*", name),
            (1, None) => format!("{}+", name),
            (min, None) => format!("{}{{{},}}", name, min),
            (min, Some(max)) if min == max => format!("{}{{{}}}", name, min),
            (min, Some(max)) => format!("{}{{{},{}}}", name, min, max),
        }
    }
}
