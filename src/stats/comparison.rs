use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::records::PlayerId;
use crate::stats::PlayerStats;

/// How a set of compared players is presented.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ComparisonMode {
    #[default]
    Table,
    Skill,
    ExperienceVsSkill,
    Stability,
    ScoreTrend,
    WinsVsLosses,
    ScoreGap,
    LastPlace,
    MaxMinGap,
}

/// Highlight for one value relative to the other compared players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Best,
    Worst,
    Neutral,
}

impl Tone {
    /// The best value is highlighted as `Best`; the opposite extreme is
    /// `Worst` only when more than one player is compared.
    pub fn for_value(value: f64, values: &[f64], higher_is_better: bool) -> Tone {
        let Some(max) = values.iter().copied().reduce(f64::max) else {
            return Tone::Neutral;
        };
        let Some(min) = values.iter().copied().reduce(f64::min) else {
            return Tone::Neutral;
        };
        let (best, worst) = if higher_is_better { (max, min) } else { (min, max) };

        if value == best {
            Tone::Best
        } else if value == worst && values.len() > 1 {
            Tone::Worst
        } else {
            Tone::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric<T> {
    pub value: T,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub player_id: PlayerId,
    pub name: String,
    pub wins: Metric<u32>,
    pub avg_score: Metric<f64>,
    pub total_games: Metric<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub player_id: PlayerId,
    pub name: String,
    pub value: f64,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceSkill {
    pub player_id: PlayerId,
    pub name: String,
    pub experience: Metric<u32>,
    pub avg_score: Metric<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub index: usize,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub player_id: PlayerId,
    pub name: String,
    pub tone: Tone,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLossSplit {
    pub player_id: PlayerId,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapRange {
    pub player_id: PlayerId,
    pub name: String,
    pub max_gap: u32,
    pub min_gap: u32,
}

/// Presentation-ready projection of `PlayerStats` for one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "data", rename_all = "snake_case")]
pub enum Comparison {
    Table(Vec<TableRow>),
    Skill(Vec<Bar>),
    ExperienceVsSkill(Vec<ExperienceSkill>),
    Stability(Vec<Bar>),
    ScoreTrend(Vec<TrendSeries>),
    WinsVsLosses(Vec<WinLossSplit>),
    ScoreGap(Vec<Bar>),
    LastPlace(Vec<Bar>),
    MaxMinGap(Vec<GapRange>),
}

impl Comparison {
    pub fn mode(&self) -> ComparisonMode {
        match self {
            Comparison::Table(_) => ComparisonMode::Table,
            Comparison::Skill(_) => ComparisonMode::Skill,
            Comparison::ExperienceVsSkill(_) => ComparisonMode::ExperienceVsSkill,
            Comparison::Stability(_) => ComparisonMode::Stability,
            Comparison::ScoreTrend(_) => ComparisonMode::ScoreTrend,
            Comparison::WinsVsLosses(_) => ComparisonMode::WinsVsLosses,
            Comparison::ScoreGap(_) => ComparisonMode::ScoreGap,
            Comparison::LastPlace(_) => ComparisonMode::LastPlace,
            Comparison::MaxMinGap(_) => ComparisonMode::MaxMinGap,
        }
    }
}

pub fn project(mode: ComparisonMode, stats: &[PlayerStats]) -> Comparison {
    match mode {
        ComparisonMode::Table => Comparison::Table(table(stats)),
        ComparisonMode::Skill => Comparison::Skill(bars(stats, true, |s| s.skill)),
        ComparisonMode::ExperienceVsSkill => {
            Comparison::ExperienceVsSkill(experience_vs_skill(stats))
        }
        ComparisonMode::Stability => Comparison::Stability(bars(stats, false, |s| s.stability)),
        ComparisonMode::ScoreTrend => Comparison::ScoreTrend(score_trend(stats)),
        ComparisonMode::WinsVsLosses => Comparison::WinsVsLosses(
            stats
                .iter()
                .map(|s| WinLossSplit {
                    player_id: s.player_id,
                    name: s.name.clone(),
                    wins: s.wins,
                    losses: s.losses,
                })
                .collect(),
        ),
        ComparisonMode::ScoreGap => {
            Comparison::ScoreGap(bars(stats, false, PlayerStats::mean_gap_from_winner))
        }
        ComparisonMode::LastPlace => {
            Comparison::LastPlace(bars(stats, false, |s| f64::from(s.last_place_count)))
        }
        ComparisonMode::MaxMinGap => Comparison::MaxMinGap(
            stats
                .iter()
                .map(|s| GapRange {
                    player_id: s.player_id,
                    name: s.name.clone(),
                    max_gap: s.max_gap,
                    min_gap: s.min_gap,
                })
                .collect(),
        ),
    }
}

fn metric<T: Copy + Into<f64>>(value: T, all: &[f64], higher_is_better: bool) -> Metric<T> {
    Metric {
        value,
        tone: Tone::for_value(value.into(), all, higher_is_better),
    }
}

fn column(stats: &[PlayerStats], field: impl Fn(&PlayerStats) -> f64) -> Vec<f64> {
    stats.iter().map(field).collect()
}

fn table(stats: &[PlayerStats]) -> Vec<TableRow> {
    let wins = column(stats, |s| f64::from(s.wins));
    let averages = column(stats, |s| s.avg_score);
    let totals = column(stats, |s| f64::from(s.total_games));

    stats
        .iter()
        .map(|s| TableRow {
            player_id: s.player_id,
            name: s.name.clone(),
            wins: metric(s.wins, &wins, true),
            avg_score: metric(s.avg_score, &averages, true),
            total_games: metric(s.total_games, &totals, true),
        })
        .collect()
}

fn bars(
    stats: &[PlayerStats],
    higher_is_better: bool,
    field: impl Fn(&PlayerStats) -> f64,
) -> Vec<Bar> {
    let values = column(stats, &field);
    stats
        .iter()
        .zip(&values)
        .map(|(s, &value)| Bar {
            player_id: s.player_id,
            name: s.name.clone(),
            value,
            tone: Tone::for_value(value, &values, higher_is_better),
        })
        .collect()
}

fn experience_vs_skill(stats: &[PlayerStats]) -> Vec<ExperienceSkill> {
    let experience = column(stats, |s| f64::from(s.experience));
    let averages = column(stats, |s| s.avg_score);

    stats
        .iter()
        .map(|s| ExperienceSkill {
            player_id: s.player_id,
            name: s.name.clone(),
            experience: metric(s.experience, &experience, true),
            avg_score: metric(s.avg_score, &averages, true),
        })
        .collect()
}

fn score_trend(stats: &[PlayerStats]) -> Vec<TrendSeries> {
    let averages = column(stats, |s| s.avg_score);

    stats
        .iter()
        .map(|s| TrendSeries {
            player_id: s.player_id,
            name: s.name.clone(),
            tone: Tone::for_value(s.avg_score, &averages, true),
            points: s
                .score_trend
                .iter()
                .enumerate()
                .map(|(index, &score)| TrendPoint { index, score })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn stats(player_id: PlayerId, name: &str) -> PlayerStats {
        PlayerStats {
            player_id,
            name: name.to_string(),
            wins: 0,
            losses: 0,
            avg_score: 0.0,
            total_games: 0,
            experience: 0,
            skill: 0.0,
            stability: 0.0,
            score_trend: Vec::new(),
            last_place_count: 0,
            max_gap: 0,
            min_gap: 0,
            gaps_from_winner: Vec::new(),
        }
    }

    fn trio() -> Vec<PlayerStats> {
        let mut anna = stats(1, "Anna");
        anna.wins = 3;
        anna.losses = 1;
        anna.total_games = 4;
        anna.experience = 4;
        anna.avg_score = 25.5;
        anna.skill = 75.0;
        anna.stability = 4.0;
        anna.score_trend = vec![20, 31, 22, 29];
        anna.gaps_from_winner = vec![0, 0, 6, 0];
        anna.max_gap = 9;
        anna.min_gap = 2;

        let mut boris = stats(2, "Boris");
        boris.wins = 1;
        boris.losses = 2;
        boris.total_games = 3;
        boris.experience = 3;
        boris.avg_score = 18.0;
        boris.skill = 100.0 / 3.0;
        boris.stability = 2.5;
        boris.last_place_count = 2;
        boris.gaps_from_winner = vec![4, 0, 8];

        let mut clara = stats(3, "Clara");
        clara.wins = 0;
        clara.losses = 2;
        clara.total_games = 2;
        clara.experience = 2;
        clara.avg_score = 21.0;
        clara.stability = 7.0;
        clara.last_place_count = 1;
        clara.gaps_from_winner = vec![10, 2];

        vec![anna, boris, clara]
    }

    #[rstest]
    #[case(10.0, &[10.0, 5.0, 7.0], true, Tone::Best)]
    #[case(5.0, &[10.0, 5.0, 7.0], true, Tone::Worst)]
    #[case(7.0, &[10.0, 5.0, 7.0], true, Tone::Neutral)]
    #[case(5.0, &[10.0, 5.0, 7.0], false, Tone::Best)]
    #[case(10.0, &[10.0, 5.0, 7.0], false, Tone::Worst)]
    #[case(3.0, &[3.0], true, Tone::Best)]
    #[case(3.0, &[3.0], false, Tone::Best)]
    #[case(4.0, &[4.0, 4.0], true, Tone::Best)]
    #[case(1.0, &[], true, Tone::Neutral)]
    fn tone_rule(
        #[case] value: f64,
        #[case] values: &[f64],
        #[case] higher_is_better: bool,
        #[case] expected: Tone,
    ) {
        assert_eq!(Tone::for_value(value, values, higher_is_better), expected);
    }

    #[test]
    fn every_mode_projects_to_itself() {
        let players = trio();
        for mode in ComparisonMode::iter() {
            assert_eq!(project(mode, &players).mode(), mode);
        }
    }

    #[test]
    fn mode_names_are_snake_case() {
        assert_eq!(
            ComparisonMode::from_str("experience_vs_skill").unwrap(),
            ComparisonMode::ExperienceVsSkill
        );
        assert_eq!(ComparisonMode::MaxMinGap.to_string(), "max_min_gap");
        assert!(ComparisonMode::from_str("pie").is_err());
    }

    #[test]
    fn table_highlights_each_column() {
        let Comparison::Table(rows) = project(ComparisonMode::Table, &trio()) else {
            panic!("expected table");
        };

        assert_eq!(rows[0].wins, Metric { value: 3, tone: Tone::Best });
        assert_eq!(rows[2].wins.tone, Tone::Worst);
        assert_eq!(rows[1].avg_score.tone, Tone::Worst);
        assert_eq!(rows[2].avg_score.tone, Tone::Neutral);
        assert_eq!(rows[1].total_games.tone, Tone::Neutral);
    }

    #[test]
    fn lower_is_better_for_stability_and_gaps() {
        let players = trio();

        let Comparison::Stability(bars) = project(ComparisonMode::Stability, &players) else {
            panic!("expected stability");
        };
        let tones: Vec<Tone> = bars.iter().map(|b| b.tone).collect();
        assert_eq!(tones, vec![Tone::Neutral, Tone::Best, Tone::Worst]);

        let Comparison::ScoreGap(bars) = project(ComparisonMode::ScoreGap, &players) else {
            panic!("expected score gap");
        };
        let values: Vec<f64> = bars.iter().map(|b| b.value).collect();
        assert_eq!(values, vec![1.5, 4.0, 6.0]);
        assert_eq!(bars[0].tone, Tone::Best);
        assert_eq!(bars[2].tone, Tone::Worst);

        let Comparison::LastPlace(bars) = project(ComparisonMode::LastPlace, &players) else {
            panic!("expected last place");
        };
        assert_eq!(bars[0].tone, Tone::Best);
        assert_eq!(bars[1].tone, Tone::Worst);
    }

    #[test]
    fn score_gap_without_games_is_zero() {
        let Comparison::ScoreGap(bars) = project(ComparisonMode::ScoreGap, &[stats(9, "New")])
        else {
            panic!("expected score gap");
        };
        assert_eq!(bars[0].value, 0.0);
        assert_eq!(bars[0].tone, Tone::Best);
    }

    #[test]
    fn trend_series_are_indexed() {
        let Comparison::ScoreTrend(series) = project(ComparisonMode::ScoreTrend, &trio()) else {
            panic!("expected trend");
        };

        assert_eq!(series[0].points.len(), 4);
        assert_eq!(series[0].points[1], TrendPoint { index: 1, score: 31 });
        assert_eq!(series[0].tone, Tone::Best);
        assert!(series[1].points.is_empty());
    }

    #[test]
    fn comparison_serializes_with_mode_tag() {
        let players = vec![trio().remove(0)];
        let value = serde_json::to_value(project(ComparisonMode::WinsVsLosses, &players)).unwrap();

        assert_eq!(
            value,
            json!({
                "mode": "wins_vs_losses",
                "data": [{"player_id": 1, "name": "Anna", "wins": 3, "losses": 1}]
            })
        );
    }
}
