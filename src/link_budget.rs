// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Link Budget Model

//! Free-space radio link budget.
//!
//! Turns a slant range into an effective channel capacity:
//!
//! ```text
//! FSPL  = 20 log10(d_km) + 20 log10(f_GHz) + 92.45
//! N     = -174 + 10 log10(B_Hz) + NF
//! Pr    = Ptx + Gtx + Grx - FSPL
//! C     = B * log2(1 + max(0, 10^((Pr - N) / 10)))
//! C_eff = C * phy_eff * mac_eff * code_rate
//! ```
//!
//! Every function here is pure. Unconfigured links fall back to
//! [`RadioParams::default`] and still yield a finite, non-zero capacity.

use serde::{Deserialize, Serialize};

/// Reference thermal noise density at 290 K, dBm/Hz.
const THERMAL_NOISE_DBM_HZ: f64 = -174.0;
/// Constant term of FSPL with distance in km and frequency in GHz.
const FSPL_KM_GHZ_CONST: f64 = 92.45;
/// Distances below this (km) are clamped before FSPL.
const MIN_DISTANCE_KM: f64 = 1e-6;

// ---------------------------------------------------------------------------
// RadioParams
// ---------------------------------------------------------------------------

/// Radio parameters shared by both ends of a hop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioParams {
    /// Carrier frequency in GHz.
    pub freq_ghz: f64,
    /// Channel bandwidth in Hz.
    pub bandwidth_hz: f64,
    /// Transmit power in dBm.
    pub tx_power_dbm: f64,
    /// Transmit antenna gain in dBi.
    pub tx_gain_dbi: f64,
    /// Receive antenna gain in dBi.
    pub rx_gain_dbi: f64,
    /// Receiver noise figure in dB.
    pub noise_figure_db: f64,
    pub phy_efficiency: f64,
    pub mac_efficiency: f64,
    pub code_rate: f64,
}

impl Default for RadioParams {
    fn default() -> Self {
        Self {
            freq_ghz: 2.4,
            bandwidth_hz: 1e6,
            tx_power_dbm: 30.0,
            tx_gain_dbi: 0.0,
            rx_gain_dbi: 0.0,
            noise_figure_db: 5.0,
            phy_efficiency: 0.8,
            mac_efficiency: 0.9,
            code_rate: 0.9,
        }
    }
}

impl RadioParams {
    /// Product of the three overhead factors, each clamped to >= 0.
    pub fn efficiency(&self) -> f64 {
        self.phy_efficiency.max(0.0) * self.mac_efficiency.max(0.0) * self.code_rate.max(0.0)
    }
}

// ---------------------------------------------------------------------------
// Budget terms
// ---------------------------------------------------------------------------

/// Free-space path loss in dB. Defined as 0 for non-positive inputs.
pub fn fspl_db(distance_km: f64, freq_ghz: f64) -> f64 {
    if distance_km <= 0.0 || freq_ghz <= 0.0 {
        return 0.0;
    }
    20.0 * distance_km.log10() + 20.0 * freq_ghz.log10() + FSPL_KM_GHZ_CONST
}

/// Thermal noise floor in dBm; `-inf` when there is no usable bandwidth.
pub fn thermal_noise_dbm(bandwidth_hz: f64, noise_figure_db: f64) -> f64 {
    if bandwidth_hz <= 0.0 {
        return f64::NEG_INFINITY;
    }
    THERMAL_NOISE_DBM_HZ + 10.0 * bandwidth_hz.log10() + noise_figure_db
}

pub fn received_power_dbm(tx_power_dbm: f64, tx_gain_dbi: f64, rx_gain_dbi: f64, fspl_db: f64) -> f64 {
    tx_power_dbm + tx_gain_dbi + rx_gain_dbi - fspl_db
}

/// SNR in dB. With no noise floor (`-inf`) this is `+inf`.
pub fn snr_db(rx_power_dbm: f64, noise_dbm: f64) -> f64 {
    rx_power_dbm - noise_dbm
}

pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

/// Shannon-Hartley capacity in bps. Negative SNR is clamped to 0.
pub fn shannon_capacity_bps(bandwidth_hz: f64, snr_linear: f64) -> f64 {
    if bandwidth_hz <= 0.0 {
        return 0.0;
    }
    bandwidth_hz * (1.0 + snr_linear.max(0.0)).log2()
}

// ---------------------------------------------------------------------------
// LinkBudget
// ---------------------------------------------------------------------------

/// Full breakdown of one hop's budget, for display and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkBudget {
    pub distance_m: f64,
    pub fspl_db: f64,
    pub rx_power_dbm: f64,
    pub noise_dbm: f64,
    pub snr_db: f64,
    pub shannon_bps: f64,
    pub effective_bps: f64,
}

impl LinkBudget {
    pub fn compute(distance_m: f64, radio: &RadioParams) -> Self {
        let distance_km = (distance_m / 1000.0).max(MIN_DISTANCE_KM);
        let fspl = fspl_db(distance_km, radio.freq_ghz);
        let rx_power = received_power_dbm(radio.tx_power_dbm, radio.tx_gain_dbi, radio.rx_gain_dbi, fspl);
        let noise = thermal_noise_dbm(radio.bandwidth_hz, radio.noise_figure_db);
        let snr_db = snr_db(rx_power, noise);
        let shannon = shannon_capacity_bps(radio.bandwidth_hz, db_to_linear(snr_db));
        let effective = (radio.efficiency() * shannon).max(0.0);
        Self {
            distance_m,
            fspl_db: fspl,
            rx_power_dbm: rx_power,
            noise_dbm: noise,
            snr_db,
            shannon_bps: shannon,
            effective_bps: effective,
        }
    }
}

/// Effective capacity in bps of a hop of `distance_m` meters.
pub fn effective_capacity_bps(distance_m: f64, radio: &RadioParams) -> f64 {
    LinkBudget::compute(distance_m, radio).effective_bps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fspl_reference_value() {
        // 1 km at 1 GHz is exactly the constant term
        assert!((fspl_db(1.0, 1.0) - 92.45).abs() < 1e-12);
        // 10x distance adds 20 dB
        assert!((fspl_db(10.0, 1.0) - 112.45).abs() < 1e-9);
    }

    #[test]
    fn fspl_zero_for_non_positive_inputs() {
        assert_eq!(fspl_db(0.0, 2.4), 0.0);
        assert_eq!(fspl_db(-5.0, 2.4), 0.0);
        assert_eq!(fspl_db(5.0, 0.0), 0.0);
    }

    #[test]
    fn fspl_increasing_in_distance_and_frequency() {
        let distances = [0.01, 0.5, 1.0, 20.0, 550.0, 36_000.0];
        for w in distances.windows(2) {
            assert!(fspl_db(w[1], 2.4) > fspl_db(w[0], 2.4));
        }
        let freqs = [0.1, 1.0, 2.4, 12.0, 30.0];
        for w in freqs.windows(2) {
            assert!(fspl_db(100.0, w[1]) > fspl_db(100.0, w[0]));
        }
    }

    #[test]
    fn noise_floor_for_one_megahertz() {
        // -174 + 60 + 5
        assert!((thermal_noise_dbm(1e6, 5.0) - (-109.0)).abs() < 1e-9);
        assert_eq!(thermal_noise_dbm(0.0, 5.0), f64::NEG_INFINITY);
    }

    #[test]
    fn shannon_never_negative() {
        assert_eq!(shannon_capacity_bps(1e6, -3.0), 0.0);
        assert_eq!(shannon_capacity_bps(0.0, 100.0), 0.0);
        // SNR of 1 (0 dB) gives exactly one bit per Hz
        assert!((shannon_capacity_bps(1e6, 1.0) - 1e6).abs() < 1e-6);
    }

    #[test]
    fn default_params_give_finite_positive_capacity() {
        for d in [1.0, 1_000.0, 111_000.0, 550_000.0, 2_000_000.0] {
            let c = effective_capacity_bps(d, &RadioParams::default());
            assert!(c.is_finite() && c > 0.0, "capacity at {d} m = {c}");
        }
    }

    #[test]
    fn capacity_decreases_with_distance() {
        let radio = RadioParams::default();
        let near = effective_capacity_bps(10_000.0, &radio);
        let far = effective_capacity_bps(100_000.0, &radio);
        assert!(near > far);
    }

    #[test]
    fn efficiency_scales_shannon() {
        let budget = LinkBudget::compute(50_000.0, &RadioParams::default());
        let expected = budget.shannon_bps * 0.8 * 0.9 * 0.9;
        assert!((budget.effective_bps - expected).abs() < 1e-6);
    }

    #[test]
    fn negative_efficiency_clamps_to_zero() {
        let radio = RadioParams { mac_efficiency: -1.0, ..Default::default() };
        assert_eq!(effective_capacity_bps(1_000.0, &radio), 0.0);
    }

    #[test]
    fn zero_bandwidth_yields_no_capacity() {
        let radio = RadioParams { bandwidth_hz: 0.0, ..Default::default() };
        let budget = LinkBudget::compute(1_000.0, &radio);
        assert_eq!(budget.noise_dbm, f64::NEG_INFINITY);
        assert_eq!(budget.effective_bps, 0.0);
    }

    #[test]
    fn colocated_nodes_stay_finite() {
        let c = effective_capacity_bps(0.0, &RadioParams::default());
        assert!(c.is_finite() && c > 0.0);
    }
}
