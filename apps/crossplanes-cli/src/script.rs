//! Event scripts for `crossplanes-cli simulate`.
//!
//! One step per line, `#` starts a comment:
//!
//! ```text
//! resize 1200 400        # window laid out at a new size
//! down primary 10 20     # pointer pressed (primary | secondary | middle)
//! move 40 20             # pointer moved
//! up primary             # pointer released
//! wheel -1               # wheel; negative zooms in
//! leave                  # pointer left the window
//! texture 0 64 64        # texture slot 0 finished loading (size optional)
//! reset                  # reset the view
//! tick                   # display refresh: run scheduled frame callbacks
//! ```

use anyhow::{Context, Result, bail};
use crossplanes_common::{SurfaceSize, TextureId};
use crossplanes_input::{ControlInput, PointerButton};
use glam::Vec2;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Resize(SurfaceSize),
    Input(ControlInput),
    Texture { id: TextureId, size: SurfaceSize },
    Reset,
    Tick,
}

pub fn parse_script(text: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let step = parse_step(line).with_context(|| format!("line {}: `{line}`", index + 1))?;
        steps.push(step);
    }
    Ok(steps)
}

fn parse_step(line: &str) -> Result<Step> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        bail!("empty step");
    };
    let args: Vec<&str> = words.collect();

    let step = match (command, args.as_slice()) {
        ("resize", [w, h]) => Step::Resize(SurfaceSize::new(number(w)?, number(h)?)),
        ("down", [button, x, y]) => Step::Input(ControlInput::PointerDown {
            button: parse_button(button)?,
            position: Vec2::new(number(x)?, number(y)?),
        }),
        ("move", [x, y]) => Step::Input(ControlInput::PointerMove {
            position: Vec2::new(number(x)?, number(y)?),
        }),
        ("up", [button]) => Step::Input(ControlInput::PointerUp {
            button: parse_button(button)?,
        }),
        ("wheel", [delta]) => Step::Input(ControlInput::Wheel {
            delta_y: number(delta)?,
        }),
        ("leave", []) => Step::Input(ControlInput::PointerLeave),
        ("texture", [id]) => Step::Texture {
            id: TextureId(number(id)?),
            size: SurfaceSize::new(1, 1),
        },
        ("texture", [id, w, h]) => Step::Texture {
            id: TextureId(number(id)?),
            size: texture_size(number(w)?, number(h)?)?,
        },
        ("reset", []) => Step::Reset,
        ("tick", []) => Step::Tick,
        (
            "resize" | "down" | "move" | "up" | "wheel" | "leave" | "texture" | "reset" | "tick",
            _,
        ) => bail!("wrong number of arguments for `{command}`"),
        _ => bail!("unknown step `{command}`"),
    };
    Ok(step)
}

fn number<T: FromStr>(word: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    word.parse()
        .with_context(|| format!("`{word}` is not a valid number"))
}

/// Largest simulated texture edge, the default wgpu 2D texture limit.
const MAX_TEXTURE_SIZE: u32 = 8192;

fn texture_size(width: u32, height: u32) -> Result<SurfaceSize> {
    if width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
        bail!("texture {width}x{height} exceeds {MAX_TEXTURE_SIZE}x{MAX_TEXTURE_SIZE}");
    }
    Ok(SurfaceSize::new(width, height))
}

fn parse_button(word: &str) -> Result<PointerButton> {
    match word {
        "primary" | "left" => Ok(PointerButton::Primary),
        "secondary" | "right" => Ok(PointerButton::Secondary),
        "middle" => Ok(PointerButton::Middle),
        other => bail!("unknown pointer button `{other}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_step_kind() {
        let script = "
            # drag, then load a texture
            resize 1200 400
            down primary 10 20
            move 40.5 20
            up left
            wheel -1
            leave
            texture 1 64 32
            texture 0
            reset
            tick
        ";
        let steps = parse_script(script).unwrap();
        assert_eq!(steps.len(), 10);
        assert_eq!(steps[0], Step::Resize(SurfaceSize::new(1200, 400)));
        assert_eq!(
            steps[2],
            Step::Input(ControlInput::PointerMove {
                position: Vec2::new(40.5, 20.0)
            })
        );
        assert_eq!(
            steps[3],
            Step::Input(ControlInput::PointerUp {
                button: PointerButton::Primary
            })
        );
        assert_eq!(
            steps[6],
            Step::Texture {
                id: TextureId(1),
                size: SurfaceSize::new(64, 32)
            }
        );
        assert_eq!(
            steps[7],
            Step::Texture {
                id: TextureId(0),
                size: SurfaceSize::new(1, 1)
            }
        );
        assert_eq!(steps[9], Step::Tick);
    }

    #[test]
    fn trailing_comments_are_ignored() {
        let steps = parse_script("tick # refresh\n\n   \n").unwrap();
        assert_eq!(steps, vec![Step::Tick]);
    }

    #[test]
    fn errors_name_the_line() {
        let err = parse_script("tick\nresize 10\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));

        let err = parse_script("jump 1 2").unwrap_err();
        assert!(format!("{err:#}").contains("unknown step"));

        let err = parse_script("down thumb 1 2").unwrap_err();
        assert!(format!("{err:#}").contains("thumb"));
    }

    #[test]
    fn oversized_textures_are_rejected() {
        let err = parse_script("texture 0 70000 70000").unwrap_err();
        assert!(format!("{err:#}").contains("exceeds 8192x8192"));

        let err = parse_script("texture 0 4294967295 4294967295").unwrap_err();
        assert!(format!("{err:#}").contains("line 1"));

        assert!(parse_script("texture 0 8192 1").is_ok());
    }
}
