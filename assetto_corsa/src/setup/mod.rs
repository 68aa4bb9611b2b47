/*
 * Copyright (c):
 * 2026 zephyrj
 * zephyrj@protonmail.com
 *
 * This file is part of setup-crane.
 *
 * setup-crane is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * setup-crane is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with setup-crane. If not, see <https://www.gnu.org/licenses/>.
 */

pub mod classify;
pub mod database;
pub mod verify;

pub use classify::{PathClassifier, SetupOrigin};
pub use database::{export_setups, ExportOutcome, ExportSummary, ManifestEntry, SetupDatabase};
pub use verify::{verify_export, ExportProblem};

use serde::{Deserialize, Serialize};
use crate::ini_utils::{get_value_or_default, Ini};

pub const SETUP_FILE_EXTENSION: &'static str = "ini";
pub const MANIFEST_FILENAME: &'static str = "manifest.json";
pub const FALLBACK_AUTHOR: &'static str = "AFN PRO";
pub const GENERIC_TRACK: &'static str = "Generic";
pub const COMMUNITY_CREDITS: &'static str = "Inspired by community benchmarks";

/// Every setup value lives in its own section under this key
const VALUE_KEY: &'static str = "VALUE";

/// One setup file for one car on one track, as published in the per-car json documents.
///
/// Field order matches the published json so consumers that diff the documents see stable
/// output. Every numeric field falls back to 0 when the source file doesn't provide a
/// usable integer for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupRecord {
    pub name: String,
    pub source: String,
    pub author: String,
    pub credits: String,
    pub car_id: String,
    pub is_remote: bool,

    pub fuel: i64,
    pub brake_bias: i64,
    pub engine_limiter: i64,

    pub pressure_lf: i64,
    pub pressure_rf: i64,
    pub pressure_lr: i64,
    pub pressure_rr: i64,

    pub wing_1: i64,
    pub wing_2: i64,

    pub camber_lf: i64,
    pub camber_rf: i64,
    pub camber_lr: i64,
    pub camber_rr: i64,

    pub toe_lf: i64,
    pub toe_rf: i64,
    pub toe_lr: i64,
    pub toe_rr: i64,

    pub spring_lf: i64,
    pub spring_rf: i64,
    pub spring_lr: i64,
    pub spring_rr: i64,

    pub rod_length_lf: i64,
    pub rod_length_rf: i64,
    pub rod_length_lr: i64,
    pub rod_length_rr: i64,

    pub arb_front: i64,
    pub arb_rear: i64,

    pub damp_bump_lf: i64,
    pub damp_bump_rf: i64,
    pub damp_bump_lr: i64,
    pub damp_bump_rr: i64,
    pub damp_rebound_lf: i64,
    pub damp_rebound_rf: i64,
    pub damp_rebound_lr: i64,
    pub damp_rebound_rr: i64,

    pub diff_power: i64,
    pub diff_coast: i64,
    pub final_ratio: i64,

    /// Reserved for gear ratio data. Always empty for now
    pub gears: Vec<f64>
}

impl SetupRecord {
    pub fn from_ini(ini_data: &Ini, origin: &SetupOrigin, fallback_author: &str) -> SetupRecord {
        let value = |section: &str| -> i64 { get_value_or_default(ini_data, section, VALUE_KEY) };
        SetupRecord {
            name: origin.setup_name(),
            source: origin.track.clone(),
            author: origin.author.clone(),
            credits: credits_for(&origin.author, fallback_author),
            car_id: origin.car_id.clone(),
            is_remote: true,

            fuel: value("FUEL"),
            brake_bias: value("FRONT_BIAS"),
            engine_limiter: value("ENGINE_LIMITER"),

            pressure_lf: value("PRESSURE_LF"),
            pressure_rf: value("PRESSURE_RF"),
            pressure_lr: value("PRESSURE_LR"),
            pressure_rr: value("PRESSURE_RR"),

            wing_1: value("WING_1"),
            wing_2: value("WING_2"),

            camber_lf: value("CAMBER_LF"),
            camber_rf: value("CAMBER_RF"),
            camber_lr: value("CAMBER_LR"),
            camber_rr: value("CAMBER_RR"),

            toe_lf: value("TOE_OUT_LF"),
            toe_rf: value("TOE_OUT_RF"),
            toe_lr: value("TOE_OUT_LR"),
            toe_rr: value("TOE_OUT_RR"),

            spring_lf: value("SPRING_RATE_LF"),
            spring_rf: value("SPRING_RATE_RF"),
            spring_lr: value("SPRING_RATE_LR"),
            spring_rr: value("SPRING_RATE_RR"),

            rod_length_lf: value("ROD_LENGTH_LF"),
            rod_length_rf: value("ROD_LENGTH_RF"),
            rod_length_lr: value("ROD_LENGTH_LR"),
            rod_length_rr: value("ROD_LENGTH_RR"),

            arb_front: value("ARB_FRONT"),
            arb_rear: value("ARB_REAR"),

            damp_bump_lf: value("DAMP_BUMP_LF"),
            damp_bump_rf: value("DAMP_BUMP_RF"),
            damp_bump_lr: value("DAMP_BUMP_LR"),
            damp_bump_rr: value("DAMP_BUMP_RR"),
            damp_rebound_lf: value("DAMP_REBOUND_LF"),
            damp_rebound_rf: value("DAMP_REBOUND_RF"),
            damp_rebound_lr: value("DAMP_REBOUND_LR"),
            damp_rebound_rr: value("DAMP_REBOUND_RR"),

            diff_power: value("DIFF_POWER"),
            diff_coast: value("DIFF_COAST"),
            final_ratio: value("FINAL_RATIO"),

            gears: Vec::new()
        }
    }
}

/// Setups that come from the fallback author get the house credit line, everyone else
/// gets the generic one
pub fn credits_for(author: &str, fallback_author: &str) -> String {
    if author == fallback_author {
        format!("Refined by {} | {}", fallback_author, COMMUNITY_CREDITS)
    } else {
        String::from(COMMUNITY_CREDITS)
    }
}

#[cfg(test)]
mod tests {
    use crate::ini_utils::Ini;
    use crate::setup::{credits_for, SetupOrigin, SetupRecord, FALLBACK_AUTHOR};

    fn origin(author: &str) -> SetupOrigin {
        SetupOrigin {
            author: author.to_string(),
            car_id: "Formula1".to_string(),
            track: "Monza".to_string(),
            file_name: "setup1.ini".to_string()
        }
    }

    const FULL_SETUP: &'static str = "\
[FUEL]\nVALUE=55\n[FRONT_BIAS]\nVALUE=58\n[ENGINE_LIMITER]\nVALUE=100\n\
[PRESSURE_LF]\nVALUE=21\n[PRESSURE_RF]\nVALUE=22\n[PRESSURE_LR]\nVALUE=23\n[PRESSURE_RR]\nVALUE=24\n\
[WING_1]\nVALUE=5\n[WING_2]\nVALUE=7\n\
[CAMBER_LF]\nVALUE=-30\n[CAMBER_RF]\nVALUE=-31\n[CAMBER_LR]\nVALUE=-18\n[CAMBER_RR]\nVALUE=-19\n\
[TOE_OUT_LF]\nVALUE=2\n[TOE_OUT_RF]\nVALUE=3\n[TOE_OUT_LR]\nVALUE=4\n[TOE_OUT_RR]\nVALUE=6\n\
[SPRING_RATE_LF]\nVALUE=110\n[SPRING_RATE_RF]\nVALUE=111\n[SPRING_RATE_LR]\nVALUE=90\n[SPRING_RATE_RR]\nVALUE=91\n\
[ROD_LENGTH_LF]\nVALUE=8\n[ROD_LENGTH_RF]\nVALUE=9\n[ROD_LENGTH_LR]\nVALUE=10\n[ROD_LENGTH_RR]\nVALUE=11\n\
[ARB_FRONT]\nVALUE=12\n[ARB_REAR]\nVALUE=13\n\
[DAMP_BUMP_LF]\nVALUE=14\n[DAMP_BUMP_RF]\nVALUE=15\n[DAMP_BUMP_LR]\nVALUE=16\n[DAMP_BUMP_RR]\nVALUE=17\n\
[DAMP_REBOUND_LF]\nVALUE=18\n[DAMP_REBOUND_RF]\nVALUE=19\n[DAMP_REBOUND_LR]\nVALUE=20\n[DAMP_REBOUND_RR]\nVALUE=25\n\
[DIFF_POWER]\nVALUE=45\n[DIFF_COAST]\nVALUE=30\n[FINAL_RATIO]\nVALUE=3\n";

    #[test]
    fn all_fields_are_read() {
        let setup = SetupRecord::from_ini(&Ini::load_from_string(FULL_SETUP), &origin("someone"), FALLBACK_AUTHOR);
        assert_eq!(setup.name, "setup1");
        assert_eq!(setup.source, "Monza");
        assert_eq!(setup.car_id, "Formula1");
        assert!(setup.is_remote);
        assert_eq!((setup.fuel, setup.brake_bias, setup.engine_limiter), (55, 58, 100));
        assert_eq!([setup.pressure_lf, setup.pressure_rf, setup.pressure_lr, setup.pressure_rr], [21, 22, 23, 24]);
        assert_eq!((setup.wing_1, setup.wing_2), (5, 7));
        assert_eq!([setup.camber_lf, setup.camber_rf, setup.camber_lr, setup.camber_rr], [-30, -31, -18, -19]);
        assert_eq!([setup.toe_lf, setup.toe_rf, setup.toe_lr, setup.toe_rr], [2, 3, 4, 6]);
        assert_eq!([setup.spring_lf, setup.spring_rf, setup.spring_lr, setup.spring_rr], [110, 111, 90, 91]);
        assert_eq!([setup.rod_length_lf, setup.rod_length_rf, setup.rod_length_lr, setup.rod_length_rr], [8, 9, 10, 11]);
        assert_eq!((setup.arb_front, setup.arb_rear), (12, 13));
        assert_eq!([setup.damp_bump_lf, setup.damp_bump_rf, setup.damp_bump_lr, setup.damp_bump_rr], [14, 15, 16, 17]);
        assert_eq!([setup.damp_rebound_lf, setup.damp_rebound_rf, setup.damp_rebound_lr, setup.damp_rebound_rr], [18, 19, 20, 25]);
        assert_eq!((setup.diff_power, setup.diff_coast, setup.final_ratio), (45, 30, 3));
        assert!(setup.gears.is_empty());
    }

    #[test]
    fn bad_fields_default_to_zero_without_touching_others() {
        let data = FULL_SETUP
            .replace("[WING_1]\nVALUE=5", "[WING_1]\nVALUE=five")
            .replace("[FINAL_RATIO]\nVALUE=3\n", "")
            .replace("[ARB_REAR]\nVALUE=13", "[ARB_REAR]\nOTHER=13")
            .replace("[DIFF_COAST]\nVALUE=30", "[DIFF_COAST]\nVALUE=30.5");
        let setup = SetupRecord::from_ini(&Ini::load_from_string(&data), &origin("someone"), FALLBACK_AUTHOR);
        assert_eq!(setup.wing_1, 0);
        assert_eq!(setup.final_ratio, 0);
        assert_eq!(setup.arb_rear, 0);
        assert_eq!(setup.diff_coast, 0);
        assert_eq!(setup.wing_2, 7);
        assert_eq!(setup.arb_front, 12);
        assert_eq!(setup.diff_power, 45);
        assert_eq!(setup.fuel, 55);
    }

    #[test]
    fn empty_file_gives_all_zero_setup() {
        let setup = SetupRecord::from_ini(&Ini::load_from_string(""), &origin("someone"), FALLBACK_AUTHOR);
        assert_eq!(setup.fuel, 0);
        assert_eq!(setup.damp_rebound_rr, 0);
        assert_eq!(setup.author, "someone");
    }

    #[test]
    fn credits_depend_on_author() {
        assert_eq!(credits_for(FALLBACK_AUTHOR, FALLBACK_AUTHOR),
                   "Refined by AFN PRO | Inspired by community benchmarks");
        assert_eq!(credits_for("someone", FALLBACK_AUTHOR), "Inspired by community benchmarks");
    }

    #[test]
    fn serializes_with_published_field_names() {
        let setup = SetupRecord::from_ini(&Ini::load_from_string("[FUEL]\nVALUE=55\n"),
                                          &origin(FALLBACK_AUTHOR),
                                          FALLBACK_AUTHOR);
        let json = serde_json::to_value(&setup).unwrap();
        assert_eq!(json["name"], "setup1");
        assert_eq!(json["source"], "Monza");
        assert_eq!(json["author"], "AFN PRO");
        assert_eq!(json["credits"], "Refined by AFN PRO | Inspired by community benchmarks");
        assert_eq!(json["car_id"], "Formula1");
        assert_eq!(json["is_remote"], true);
        assert_eq!(json["fuel"], 55);
        assert_eq!(json["brake_bias"], 0);
        assert_eq!(json["gears"], serde_json::json!([]));
        assert_eq!(json.as_object().unwrap().len(), 45);
    }
}
