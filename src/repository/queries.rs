//! SQL templates for the three map layers.
//!
//! Every template takes the same parameters: `$1..$4` are the bounding box
//! (min_lon, min_lat, max_lon, max_lat in EPSG:4326) and `$5` is the row
//! ceiling as a bigint. Each returns exactly one row with one `jsonb`
//! column holding a complete FeatureCollection.

use crate::models::{ComplianceStatus, Layer, GEOGRAPHIC_SRID, LOCAL_SRID, UNZONED};

/// Build the SQL for a layer.
pub fn layer_sql(layer: Layer) -> String {
    match layer {
        Layer::Buildings => buildings_sql(),
        Layer::Zoning => zoning_sql(),
        Layer::Parcels => parcels_sql(),
    }
}

/// Wrap a per-feature subquery in the FeatureCollection aggregate.
///
/// `jsonb_agg` over zero rows yields NULL, hence the COALESCE.
fn feature_collection(features_subquery: &str) -> String {
    format!(
        r#"SELECT jsonb_build_object(
    'type', 'FeatureCollection',
    'features', COALESCE(jsonb_agg(f), '[]'::jsonb)
)
FROM (
{features_subquery}
) AS f"#
    )
}

/// Envelope filter on a geometry expression already in the local SRID.
fn bbox_filter(geom: &str) -> String {
    format!(
        "{geom} && ST_Transform(ST_MakeEnvelope($1, $2, $3, $4, {GEOGRAPHIC_SRID}), {LOCAL_SRID})"
    )
}

/// Building footprints with their centroid zoning and compliance status.
///
/// Footprints are assumed valid and are not passed through ST_MakeValid.
/// Overlapping districts resolve to whichever single row the planner
/// returns first.
fn buildings_sql() -> String {
    let geom = format!("ST_SetSRID(b.geom, {LOCAL_SRID})");
    let compliant = ComplianceStatus::Compliant.as_str();
    let conflict = ComplianceStatus::Conflict.as_str();

    feature_collection(&format!(
        r#"    SELECT
        'Feature' AS type,
        b.gid AS id,
        ST_AsGeoJSON(ST_Transform({geom}, {GEOGRAPHIC_SRID}))::jsonb AS geometry,
        jsonb_build_object(
            'pin', b.pin,
            'use', b.comment_,
            'zoning', COALESCE(z.zoning, '{UNZONED}'),
            'status', CASE
                WHEN r.allowed_land_use IS NULL OR b.comment_ = r.allowed_land_use
                THEN '{compliant}'
                ELSE '{conflict}'
            END
        ) AS properties
    FROM building_footprint_2023 b
    LEFT JOIN LATERAL (
        SELECT sz.zoning
        FROM seatle_zoning sz
        WHERE ST_Intersects(ST_Centroid({geom}), ST_SetSRID(sz.geom, {LOCAL_SRID}))
        LIMIT 1
    ) z ON TRUE
    LEFT JOIN LATERAL (
        SELECT zr.allowed_land_use
        FROM zoning_rules zr
        WHERE zr.zoning_code = z.zoning
        LIMIT 1
    ) r ON TRUE
    WHERE {filter}
    LIMIT $5"#,
        filter = bbox_filter(&geom),
    ))
}

/// Repair, flatten, and reproject a polygon column for output.
fn cleaned_geometry(column: &str) -> String {
    format!(
        "ST_AsGeoJSON(ST_Transform(ST_Force2D(ST_MakeValid(ST_SetSRID({column}, {LOCAL_SRID}))), {GEOGRAPHIC_SRID}))::jsonb"
    )
}

fn zoning_sql() -> String {
    feature_collection(&format!(
        r#"    SELECT
        'Feature' AS type,
        gid AS id,
        {geometry} AS geometry,
        jsonb_build_object('code', zoning, 'category', category_d) AS properties
    FROM seatle_zoning
    WHERE {filter}
    LIMIT $5"#,
        geometry = cleaned_geometry("geom"),
        filter = bbox_filter(&format!("ST_SetSRID(geom, {LOCAL_SRID})")),
    ))
}

fn parcels_sql() -> String {
    feature_collection(&format!(
        r#"    SELECT
        'Feature' AS type,
        gid AS id,
        {geometry} AS geometry,
        jsonb_build_object('name', name, 'city', citydst) AS properties
    FROM admin_parcels
    WHERE {filter}
    LIMIT $5"#,
        geometry = cleaned_geometry("geom"),
        filter = bbox_filter(&format!("ST_SetSRID(geom, {LOCAL_SRID})")),
    ))
}
