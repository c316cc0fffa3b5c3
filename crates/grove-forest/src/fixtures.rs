//! Play-tennis data set shared by unit tests.

use crate::item::{Item, LabeledItem};

pub(crate) const SUNNY: i32 = 1;
pub(crate) const OVERCAST: i32 = 2;
pub(crate) const RAIN: i32 = 3;

pub(crate) const HOT: i32 = 1;
pub(crate) const MILD: i32 = 2;
pub(crate) const COOL: i32 = 3;

pub(crate) const HIGH: i32 = 1;
pub(crate) const NORMAL: i32 = 2;

pub(crate) const WEAK: i32 = 1;
pub(crate) const STRONG: i32 = 2;

pub(crate) fn tennis_attributes() -> Vec<String> {
    ["outlook", "temp", "humidity", "wind"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

pub(crate) fn tennis_item(id: &str, outlook: i32, temp: i32, humidity: i32, wind: i32) -> Item {
    Item::new(
        id,
        [
            ("outlook", outlook),
            ("temp", temp),
            ("humidity", humidity),
            ("wind", wind),
        ],
    )
}

pub(crate) fn tennis_training_set() -> Vec<LabeledItem> {
    let rows = [
        (SUNNY, HOT, HIGH, WEAK, 0),
        (SUNNY, HOT, HIGH, STRONG, 0),
        (OVERCAST, HOT, HIGH, WEAK, 1),
        (RAIN, MILD, HIGH, WEAK, 1),
        (RAIN, COOL, NORMAL, WEAK, 1),
        (RAIN, COOL, NORMAL, STRONG, 0),
        (OVERCAST, COOL, NORMAL, STRONG, 1),
        (SUNNY, MILD, HIGH, WEAK, 0),
        (SUNNY, COOL, NORMAL, WEAK, 1),
        (RAIN, MILD, NORMAL, WEAK, 1),
        (SUNNY, MILD, NORMAL, STRONG, 1),
        (OVERCAST, MILD, HIGH, STRONG, 1),
        (OVERCAST, HOT, NORMAL, WEAK, 1),
        (RAIN, MILD, HIGH, STRONG, 0),
    ];
    rows.iter()
        .enumerate()
        .map(|(i, &(outlook, temp, humidity, wind, label))| {
            let id = (i + 1).to_string();
            LabeledItem::new(tennis_item(&id, outlook, temp, humidity, wind), label)
        })
        .collect()
}
