//! Tsitouras 5(4) Butcher tableau
//!
//! Seven stages, first-same-as-last: the `b` row equals the final `a` row,
//! so the last stage derivative of an accepted step doubles as the first
//! stage of the next one. Coefficients from Tsitouras (2011), "Runge–Kutta
//! pairs of order 5(4) satisfying only the first column simplifying
//! assumption".

/// Stage abscissae `cᵢ`.
pub(crate) const C: [f64; 7] = [
    0.0,
    0.161,
    0.327,
    0.9,
    0.980_025_540_904_509_7,
    1.0,
    1.0,
];

/// Lower-triangular stage coefficients; row `s` weights `k₀..k_{s-1}`.
pub(crate) const A: [[f64; 6]; 7] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [0.161, 0.0, 0.0, 0.0, 0.0, 0.0],
    [-0.008_480_655_492_356_989, 0.335_480_655_492_357, 0.0, 0.0, 0.0, 0.0],
    [2.897_153_057_105_493_5, -6.359_448_489_975_075, 4.362_295_432_869_581_5, 0.0, 0.0, 0.0],
    [
        5.325_864_828_439_257,
        -11.748_883_564_062_828,
        7.495_539_342_889_836_5,
        -0.092_495_066_361_755_25,
        0.0,
        0.0,
    ],
    [
        5.861_455_442_946_42,
        -12.920_969_317_847_11,
        8.159_367_898_576_159,
        -0.071_584_973_281_401,
        -0.028_269_050_394_068_383,
        0.0,
    ],
    [
        0.096_460_766_818_065_23,
        0.01,
        0.479_889_650_414_499_6,
        1.379_008_574_103_742,
        -3.290_069_515_436_081,
        2.324_710_524_099_774,
    ],
];

/// Fifth-order solution weights (equal to `A[6]`, with `b₇ = 0`).
pub(crate) const B: [f64; 7] = [
    0.096_460_766_818_065_23,
    0.01,
    0.479_889_650_414_499_6,
    1.379_008_574_103_742,
    -3.290_069_515_436_081,
    2.324_710_524_099_774,
    0.0,
];

/// Embedded difference weights: `y_high − y_low = h·Σ b̃ᵢ·kᵢ`.
pub(crate) const B_TILDE: [f64; 7] = [
    -0.001_780_011_052_225_771_4,
    -0.000_816_434_459_656_746_9,
    0.007_880_878_010_261_995,
    -0.144_711_007_173_262_9,
    0.582_357_165_452_555_2,
    -0.458_082_105_929_186_97,
    0.015_151_515_151_515_152,
];
