// Built-in tier table, used to seed an empty config store

use super::{Benefits, Category, Level, Requirements};
use crate::config::{LEVEL_ID_PREFIX, UNBOUNDED_REFERRALS};

// (min, max, revTotal, revLevel1, revLevels2to5, levelUpReward)
type Row = (u64, u64, f64, f64, f64, f64);

const JOGADOR: &[Row] = &[
    (0, 4, 5.00, 3.00, 0.50, 0.0),
    (5, 9, 6.00, 3.60, 0.60, 10.0),
    (10, 14, 7.00, 4.20, 0.70, 20.0),
];

const INICIANTE: &[Row] = &[
    (15, 18, 9.00, 5.40, 0.90, 30.0),
    (19, 22, 11.00, 6.60, 1.10, 40.0),
    (23, 26, 13.00, 7.80, 1.30, 50.0),
    (27, 30, 15.00, 9.00, 1.50, 60.0),
];

const AFILIADO: &[Row] = &[
    (31, 40, 18.00, 10.80, 1.80, 80.0),
    (41, 50, 20.00, 12.00, 2.00, 100.0),
    (51, 60, 22.00, 13.20, 2.20, 120.0),
    (61, 70, 24.00, 14.40, 2.40, 140.0),
    (71, 80, 26.00, 15.60, 2.60, 160.0),
    (81, 90, 28.00, 16.80, 2.80, 180.0),
    (91, 100, 30.00, 18.00, 3.00, 200.0),
];

const PROFISSIONAL: &[Row] = &[
    (101, 130, 34.00, 20.40, 3.40, 300.0),
    (131, 160, 36.00, 21.60, 3.60, 350.0),
    (161, 190, 38.00, 22.80, 3.80, 400.0),
    (191, 220, 40.00, 24.00, 4.00, 450.0),
    (221, 250, 42.00, 25.20, 4.20, 500.0),
];

const EXPERT: &[Row] = &[
    (251, 300, 45.00, 27.00, 4.50, 750.0),
    (301, 350, 47.00, 28.20, 4.70, 850.0),
    (351, 400, 49.00, 29.40, 4.90, 950.0),
    (401, 450, 51.00, 30.60, 5.10, 1050.0),
    (451, 500, 53.00, 31.80, 5.30, 1150.0),
];

const MESTRE: &[Row] = &[
    (501, 600, 56.00, 33.60, 5.60, 1500.0),
    (601, 700, 58.00, 34.80, 5.80, 1750.0),
    (701, 800, 60.00, 36.00, 6.00, 2000.0),
    (801, 900, 62.00, 37.20, 6.20, 2250.0),
    (901, 1000, 64.00, 38.40, 6.40, 2500.0),
];

const LENDA: &[Row] = &[
    (1001, 2500, 66.00, 39.60, 6.60, 5000.0),
    (2501, 5000, 68.00, 40.80, 6.80, 7500.0),
    (5001, UNBOUNDED_REFERRALS, 70.00, 42.00, 7.00, 10000.0),
];

fn levels(rows: &[Row]) -> Vec<Level> {
    rows.iter()
        .enumerate()
        .map(|(i, &(min, max, total, level1, levels2to5, reward))| {
            Level::new(
                format!("{}{}", LEVEL_ID_PREFIX, i + 1),
                format!("Level {}", i + 1),
                Requirements::new(min, max),
                Benefits::new(total, level1, levels2to5).with_level_up_reward(reward),
            )
        })
        .collect()
}

/// The seven affiliate categories with their default levels
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(
            "jogador",
            "Jogador",
            "Player starting to refer friends",
            levels(JOGADOR),
        ),
        Category::new(
            "iniciante",
            "Iniciante",
            "Beginner affiliate with a first small network",
            levels(INICIANTE),
        ),
        Category::new(
            "afiliado",
            "Afiliado",
            "Regular affiliate",
            levels(AFILIADO),
        ),
        Category::new(
            "profissional",
            "Profissional",
            "Professional affiliate",
            levels(PROFISSIONAL),
        ),
        Category::new(
            "expert",
            "Expert",
            "Expert affiliate with a large network",
            levels(EXPERT),
        ),
        Category::new("mestre", "Mestre", "Master affiliate", levels(MESTRE)),
        Category::new(
            "lenda",
            "Lenda",
            "Legend tier, open-ended",
            levels(LENDA),
        ),
    ]
}
