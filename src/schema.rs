//! Canonical column names used after loading.
//! Source headers are mapped onto these by the loader.

// ── Product columns ─────────────────────────────────────────────────────────
pub mod product {
    pub const BARCODE: &str = "barcode";
    pub const DESCRIPTION: &str = "description";
    pub const CONTENT_VOLUME: &str = "content_volume";

    pub const REQUIRED: [&str; 3] = [BARCODE, DESCRIPTION, CONTENT_VOLUME];
}

// ── Sale columns ────────────────────────────────────────────────────────────
pub mod sale {
    pub const BARCODE: &str = "barcode";
    pub const OUTLET_ID: &str = "outlet_id";
    pub const COMMERCIAL_DATE: &str = "commercial_date";
    pub const UNITS_SOLD: &str = "units_sold";

    pub const REQUIRED: [&str; 4] = [BARCODE, OUTLET_ID, COMMERCIAL_DATE, UNITS_SOLD];
}

// ── Derived columns ─────────────────────────────────────────────────────────
pub mod derived {
    pub const OUTLET_COUNT: &str = "outlet_count";
    pub const LITERS: &str = "liters";
    pub const LITERS_PCT: &str = "liters_pct";
    pub const LITERS_CUM: &str = "liters_cum";
    pub const DAYS_OPEN: &str = "days_open";
    pub const DAYS_WITH_SALE: &str = "days_with_sale";
    pub const OUTLET: &str = "outlet";
    pub const FREQUENCY: &str = "frequency";
    pub const MONTH: &str = "month";
    pub const UNITS: &str = "units";
}

// ── Artifact file names ─────────────────────────────────────────────────────
pub mod artifact {
    pub const COVERAGE: &str = "pregunta_1_productos_80_por_ciento.csv";
    pub const PARETO: &str = "pregunta_2_productos_pareto.csv";
    pub const FREQUENCY: &str = "pregunta_3_frecuencia_por_producto.csv";
    pub const VARIATION: &str = "pregunta_4_variacion_ventas.txt";
    pub const MONTHLY: &str = "pregunta_5_ventas_producto_objetivo.csv";
    pub const GROWTH: &str = "pregunta_5_causa_crecimiento.txt";
}
