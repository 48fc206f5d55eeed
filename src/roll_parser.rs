use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, space0},
    combinator::{all_consuming, map_res, opt, value},
    sequence::{delimited, pair, preceded, terminated},
};

use crate::{
    error::{Error, Result},
    rules::{
        dice::{DieSpec, RollMode},
        record::{MAX_BONUS, bonus_in_range},
    },
};

/// A single-die roll as written in notation like `d20+3 [blessed]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollRequest {
    pub die: DieSpec,
    pub bonus: i32,
    pub mode: RollMode,
}

impl RollRequest {
    pub fn new(die: DieSpec) -> Self {
        Self {
            die,
            bonus: 0,
            mode: RollMode::Normal,
        }
    }

    pub fn bonus(mut self, bonus: i32) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn mode(mut self, mode: RollMode) -> Self {
        self.mode = mode;
        self
    }

    /// Adds `extra` to the bonus, failing if the sum leaves the allowed range.
    pub fn add_bonus(self, extra: i32) -> Result<Self> {
        let bonus = self.bonus.checked_add(extra).ok_or_else(|| Error::Parse {
            input: format!("{self} {extra:+}"),
            reason: format!("bonus must be within -{MAX_BONUS}..={MAX_BONUS}"),
        })?;
        let request = self.bonus(bonus);
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        if bonus_in_range(self.bonus) {
            Ok(())
        } else {
            Err(Error::Parse {
                input: self.to_string(),
                reason: format!("bonus must be within -{MAX_BONUS}..={MAX_BONUS}"),
            })
        }
    }
}

impl std::fmt::Display for RollRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.die)?;
        if self.bonus != 0 {
            write!(f, "{:+}", self.bonus)?;
        }
        if self.mode.is_dual() {
            write!(f, " [{}]", self.mode.label().to_lowercase())?;
        }
        Ok(())
    }
}

pub fn parse_roll(input: &str) -> Result<RollRequest> {
    let res = all_consuming(delimited(space0, roll_request, space0)).parse(input);

    let (sides, bonus, mode) = match res {
        Ok((_, parsed)) => parsed,
        Err(err) => {
            return Err(Error::Parse {
                input: input.to_string(),
                reason: err.to_string(),
            });
        }
    };

    if !bonus_in_range(bonus) {
        return Err(Error::Parse {
            input: input.to_string(),
            reason: format!("bonus must be within -{MAX_BONUS}..={MAX_BONUS}"),
        });
    }

    Ok(RollRequest {
        die: DieSpec::new(sides)?,
        bonus,
        mode,
    })
}

/// Parses a bare die such as `d20` or `1d6`, with no bonus or mode.
pub fn parse_die(input: &str) -> Result<DieSpec> {
    match all_consuming(delimited(space0, die_faces, space0)).parse(input) {
        Ok((_, sides)) => DieSpec::new(sides),
        Err(err) => Err(Error::Parse {
            input: input.to_string(),
            reason: err.to_string(),
        }),
    }
}

fn die_faces(input: &str) -> IResult<&str, u32> {
    preceded(
        opt(terminated(char('1'), space0)),
        preceded(
            alt((char('d'), char('D'))),
            map_res(digit1, |s: &str| s.parse::<u32>()),
        ),
    )
    .parse(input)
}

fn roll_request(input: &str) -> IResult<&str, (u32, i32, RollMode)> {
    let (input, (sides, bonus, mode)) = (
        die_faces,
        opt(preceded(
            space0,
            pair(
                alt((char('+'), char('-'))),
                preceded(space0, map_res(digit1, |s: &str| s.parse::<i32>())),
            ),
        )),
        opt(preceded(space0, roll_mode)),
    )
        .parse(input)?;

    let bonus = match bonus {
        Some(('-', amount)) => -amount,
        Some((_, amount)) => amount,
        None => 0,
    };

    Ok((input, (sides, bonus, mode.unwrap_or_default())))
}

fn roll_mode(input: &str) -> IResult<&str, RollMode> {
    delimited(
        char('['),
        preceded(
            space0,
            alt((
                value(RollMode::Blessed, alt((tag_no_case("blessed"), tag_no_case("adv")))),
                value(RollMode::Cursed, alt((tag_no_case("cursed"), tag_no_case("dis")))),
                value(RollMode::Normal, tag_no_case("normal")),
            )),
        ),
        preceded(space0, char(']')),
    )
    .parse(input)
}
