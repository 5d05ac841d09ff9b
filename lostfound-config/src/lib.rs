//! Configuration for the Lost&Found feed.
//!
//! The config file is KDL. Every node is optional; missing nodes fall back to
//! the defaults below, which reproduce the tuned values of the original feed
//! (600 ms shuffle, 50 ms stagger, enter after a 100 ms beat, 300 ms exit).

use std::path::Path;
use std::str::FromStr;

use knuffel::errors::DecodeError;
use miette::{Context, IntoDiagnostic};

#[derive(knuffel::Decode, Debug, Clone, PartialEq, Default)]
pub struct Config {
    #[knuffel(child, default)]
    pub feed: Feed,
    #[knuffel(child, default)]
    pub animations: Animations,
}

/// Geometry of the feed grid.
#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq)]
pub struct Feed {
    #[knuffel(child, unwrap(argument), default = Self::default().columns)]
    pub columns: usize,
    #[knuffel(child, unwrap(argument), default = Self::default().gap)]
    pub gap: f64,
    #[knuffel(child, default)]
    pub card_size: CardSize,
}

#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq)]
pub struct CardSize {
    #[knuffel(argument)]
    pub width: f64,
    #[knuffel(argument)]
    pub height: f64,
}

#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct Animations {
    /// Disables all animations; transitions complete instantly.
    #[knuffel(child)]
    pub off: bool,
    /// Multiplier on every animation duration, for debugging.
    #[knuffel(child, unwrap(argument), default = Self::default().slowdown)]
    pub slowdown: f64,
    /// Delay between consecutive item animation starts within a batch.
    #[knuffel(child, unwrap(argument), default = Self::default().stagger_ms)]
    pub stagger_ms: u32,
    /// Items gliding from their old grid slot to their new one.
    #[knuffel(child, default = Self::default().item_movement)]
    pub item_movement: Animation,
    /// Items fading and scaling in.
    #[knuffel(child, default = Self::default().item_enter)]
    pub item_enter: Animation,
    /// Items fading and scaling out.
    #[knuffel(child, default = Self::default().item_exit)]
    pub item_exit: Animation,
}

/// A single animation timeline.
#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    #[knuffel(child)]
    pub off: bool,
    #[knuffel(child, unwrap(argument), default = Self::default().duration_ms)]
    pub duration_ms: u32,
    #[knuffel(child, unwrap(argument), default = Self::default().delay_ms)]
    pub delay_ms: u32,
    #[knuffel(child, unwrap(argument), default)]
    pub curve: AnimationCurve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationCurve {
    Linear,
    EaseOutQuad,
    #[default]
    EaseOutCubic,
    EaseInOutQuart,
    EaseOutExpo,
}

impl Default for Feed {
    fn default() -> Self {
        Self {
            columns: 4,
            gap: 24.,
            card_size: CardSize::default(),
        }
    }
}

impl Default for CardSize {
    fn default() -> Self {
        Self {
            width: 302.,
            height: 326.,
        }
    }
}

impl Default for Animations {
    fn default() -> Self {
        Self {
            off: false,
            slowdown: 1.,
            stagger_ms: 50,
            item_movement: Animation {
                duration_ms: 600,
                curve: AnimationCurve::EaseInOutQuart,
                ..Default::default()
            },
            item_enter: Animation {
                duration_ms: 400,
                delay_ms: 100,
                curve: AnimationCurve::EaseOutQuad,
                ..Default::default()
            },
            item_exit: Animation {
                duration_ms: 300,
                curve: AnimationCurve::EaseOutQuad,
                ..Default::default()
            },
        }
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            off: false,
            duration_ms: 250,
            delay_ms: 0,
            curve: AnimationCurve::EaseOutCubic,
        }
    }
}

impl Config {
    pub fn parse(filename: &str, text: &str) -> Result<Self, knuffel::Error> {
        let config = knuffel::parse(filename, text)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {path:?}"))?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        Self::parse(&filename, &contents).map_err(miette::Report::new)
    }
}

impl FromStr for AnimationCurve {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Self::Linear),
            "ease-out-quad" => Ok(Self::EaseOutQuad),
            "ease-out-cubic" => Ok(Self::EaseOutCubic),
            "ease-in-out-quart" => Ok(Self::EaseInOutQuart),
            "ease-out-expo" => Ok(Self::EaseOutExpo),
            _ => Err(()),
        }
    }
}

impl<S: knuffel::traits::ErrorSpan> knuffel::DecodeScalar<S> for AnimationCurve {
    fn type_check(
        type_name: &Option<knuffel::span::Spanned<knuffel::ast::TypeName, S>>,
        ctx: &mut knuffel::decode::Context<S>,
    ) {
        if let Some(type_name) = &type_name {
            ctx.emit_error(DecodeError::unexpected(
                type_name,
                "type name",
                "no type name expected for this node",
            ));
        }
    }

    fn raw_decode(
        val: &knuffel::span::Spanned<knuffel::ast::Literal, S>,
        ctx: &mut knuffel::decode::Context<S>,
    ) -> Result<Self, DecodeError<S>> {
        match &**val {
            knuffel::ast::Literal::String(ref s) => match Self::from_str(s) {
                Ok(curve) => Ok(curve),
                Err(()) => {
                    ctx.emit_error(DecodeError::conversion(
                        val,
                        format!(
                            "unknown animation curve `{s}`, expected linear, ease-out-quad, \
                             ease-out-cubic, ease-in-out-quart or ease-out-expo"
                        ),
                    ));
                    Ok(Self::default())
                }
            },
            _ => {
                ctx.emit_error(DecodeError::scalar_kind(
                    knuffel::decode::Kind::String,
                    val,
                ));
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_empty() {
        let config = Config::parse("test.kdl", "").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parse_full() {
        let text = r#"
            feed {
                columns 3
                gap 16.0
                card-size 250.0 280.0
            }
            animations {
                off
                slowdown 2.0
                stagger-ms 25
                item-movement {
                    duration-ms 400
                    curve "ease-out-expo"
                }
                item-enter {
                    duration-ms 200
                    delay-ms 50
                    curve "linear"
                }
                item-exit {
                    off
                    duration-ms 150
                    curve "ease-out-cubic"
                }
            }
        "#;

        let config = Config::parse("test.kdl", text).unwrap();
        assert_eq!(
            config,
            Config {
                feed: Feed {
                    columns: 3,
                    gap: 16.,
                    card_size: CardSize {
                        width: 250.,
                        height: 280.,
                    },
                },
                animations: Animations {
                    off: true,
                    slowdown: 2.,
                    stagger_ms: 25,
                    item_movement: Animation {
                        off: false,
                        duration_ms: 400,
                        delay_ms: 0,
                        curve: AnimationCurve::EaseOutExpo,
                    },
                    item_enter: Animation {
                        off: false,
                        duration_ms: 200,
                        delay_ms: 50,
                        curve: AnimationCurve::Linear,
                    },
                    item_exit: Animation {
                        off: true,
                        duration_ms: 150,
                        delay_ms: 0,
                        curve: AnimationCurve::EaseOutCubic,
                    },
                },
            }
        );
    }

    #[test]
    fn partial_animation_node_keeps_field_defaults() {
        let text = r#"
            animations {
                item-movement {
                    duration-ms 100
                }
            }
        "#;

        let config = Config::parse("test.kdl", text).unwrap();
        let movement = config.animations.item_movement;
        assert_eq!(movement.duration_ms, 100);
        assert_eq!(movement.delay_ms, 0);
        assert_eq!(movement.curve, AnimationCurve::EaseOutCubic);
    }

    #[test]
    fn unknown_curve_is_an_error() {
        let text = r#"
            animations {
                item-enter {
                    curve "bouncy"
                }
            }
        "#;

        assert!(Config::parse("test.kdl", text).is_err());
    }

    #[test]
    fn default_config_parses() {
        let text = include_str!("../../resources/default-config.kdl");
        let config = Config::parse("default-config.kdl", text).unwrap();
        assert_eq!(config, Config::default());
    }
}
