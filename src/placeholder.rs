//! Ordered placeholder substitution shared by tag formats and message
//! templates.
//!
//! A placeholder set is an explicit, ordered list of (token, resolver) pairs.
//! Text is scanned once from left to right; at each position the first token
//! in list order that matches wins, so `YYYY` listed before `YY` is never
//! read as two `YY`s. Substituted values are emitted as-is and never
//! rescanned.

/// A token and the function producing its replacement from a context value.
pub struct Placeholder<C> {
    pub token: &'static str,
    pub resolve: fn(&C) -> String,
}

/// A piece of scanned text.
pub enum Segment<'a, C> {
    Literal(&'a str),
    Token(&'a Placeholder<C>),
}

/// Split `text` into literal runs and recognised placeholder tokens.
pub fn tokenize<'a, C>(
    text: &'a str,
    placeholders: &'a [Placeholder<C>],
) -> Vec<Segment<'a, C>> {
    let mut segments = vec![];
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];

        match placeholders
            .iter()
            .find(|p| !p.token.is_empty() && rest.starts_with(p.token))
        {
            Some(placeholder) => {
                if literal_start < pos {
                    segments.push(Segment::Literal(&text[literal_start..pos]));
                }
                segments.push(Segment::Token(placeholder));
                pos += placeholder.token.len();
                literal_start = pos;
            }
            None => {
                pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    if literal_start < text.len() {
        segments.push(Segment::Literal(&text[literal_start..]));
    }

    segments
}

/// Replace every placeholder in `text` using the resolvers against `ctx`.
pub fn substitute<C>(
    text: &str,
    placeholders: &[Placeholder<C>],
    ctx: &C,
) -> String {
    tokenize(text, placeholders)
        .into_iter()
        .map(|segment| match segment {
            Segment::Literal(literal) => literal.to_string(),
            Segment::Token(placeholder) => (placeholder.resolve)(ctx),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ctx {
        name: String,
    }

    fn placeholders() -> Vec<Placeholder<Ctx>> {
        vec![
            Placeholder {
                token: "AAAA",
                resolve: |_| "four".into(),
            },
            Placeholder {
                token: "AA",
                resolve: |_| "two".into(),
            },
            Placeholder {
                token: "{name}",
                resolve: |ctx| ctx.name.clone(),
            },
        ]
    }

    #[test]
    fn earlier_tokens_take_priority() {
        let ctx = Ctx { name: "x".into() };
        assert_eq!(substitute("AAAA-AA", &placeholders(), &ctx), "four-two");
        assert_eq!(substitute("AAAAAA", &placeholders(), &ctx), "fourtwo");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let ctx = Ctx {
            name: "AA {name}".into(),
        };
        assert_eq!(
            substitute("hello {name}!", &placeholders(), &ctx),
            "hello AA {name}!"
        );
    }

    #[test]
    fn keeps_multibyte_literals_intact() {
        let ctx = Ctx { name: "é".into() };
        assert_eq!(
            substitute("ünïcode {name} ✓", &placeholders(), &ctx),
            "ünïcode é ✓"
        );
    }
}
