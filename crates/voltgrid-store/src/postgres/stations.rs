//! StationStore implementation over PostGIS.
//!
//! All distance predicates run on the `geography` type, never on projected
//! geometry: ST_Distance over geography is the geodesic answer, while a
//! Mercator projection overstates distances at station latitudes by far
//! more than the duplicate search radius.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use voltgrid_core::error::{Result, VoltgridError};
use voltgrid_core::models::{
    Address, Charging, MergedStation, MergedStationSource, NearbyStation, StationId, StationSeed,
};
use voltgrid_geo::StationPoint;

use super::PostgresStore;
use crate::ports::StationStore;

fn row_address(row: &PgRow) -> Option<Address> {
    let address = Address {
        street: row.get("street"),
        town: row.get("town"),
        postcode: row.get("postcode"),
        district: row.get("district"),
        state: row.get("state"),
        country: row.get("country"),
    };
    (address != Address::default()).then_some(address)
}

fn row_charging(row: &PgRow) -> Option<Charging> {
    let charging = Charging {
        capacity: row.get("capacity"),
        kw_list: row.get("kw_list"),
        socket_type_list: row.get("socket_type_list"),
        total_kw: row.get("total_kw"),
        max_kw: row.get("max_kw"),
        dc_support: row.get("dc_support"),
    };
    (charging != Charging::default()).then_some(charging)
}

#[async_trait]
impl StationStore for PostgresStore {
    async fn merge_candidates(&self, country_code: &str) -> Result<Vec<StationSeed>> {
        let rows = sqlx::query(
            r#"
            SELECT id, ST_AsText(point::geometry) AS point
            FROM stations
            WHERE NOT is_merged
              AND (merge_status <> 'is_duplicate' OR merge_status IS NULL)
              AND country_code = $1
              AND point IS NOT NULL
            ORDER BY id
            "#,
        )
        .bind(country_code)
        .fetch_all(self.pool())
        .await
        .map_err(|e| VoltgridError::Storage(format!("Failed to list merge candidates: {}", e)))?;

        let mut seeds = Vec::with_capacity(rows.len());
        for row in rows {
            let wkt: String = row.get("point");
            seeds.push(StationSeed {
                id: StationId(row.get("id")),
                point: StationPoint::from_wkt(&wkt)?,
            });
        }
        Ok(seeds)
    }

    async fn stations_within_radius(
        &self,
        center: &StationPoint,
        radius_m: f64,
        country_code: &str,
    ) -> Result<Vec<NearbyStation>> {
        let center_wkt = center.to_wkt();
        let rows = sqlx::query(
            r#"
            SELECT
                s.id, s.source_id, s.data_source, s.operator, s.payment, s.authentication,
                ST_AsText(s.point::geometry) AS point,
                a.street, a.town, a.postcode, a.district, a.state, a.country,
                c.capacity, c.kw_list, c.socket_type_list, c.total_kw, c.max_kw, c.dc_support,
                ST_Distance(s.point, ST_PointFromText($1, 4326)::geography) AS distance
            FROM stations s
            LEFT JOIN address a ON s.id = a.station_id
            LEFT JOIN charging c ON s.id = c.station_id
            WHERE ST_DWithin(s.point, ST_PointFromText($1, 4326)::geography, $2)
              AND NOT s.is_merged
              AND (s.merge_status <> 'is_duplicate' OR s.merge_status IS NULL)
              AND s.country_code = $3
            ORDER BY s.id
            "#,
        )
        .bind(&center_wkt)
        .bind(radius_m)
        .bind(country_code)
        .fetch_all(self.pool())
        .await
        .map_err(|e| VoltgridError::Storage(format!("Failed to query nearby stations: {}", e)))?;

        let mut nearby = Vec::with_capacity(rows.len());
        for row in rows {
            let wkt: String = row.get("point");
            nearby.push(NearbyStation {
                id: StationId(row.get("id")),
                source_id: row.get("source_id"),
                data_source: row.get("data_source"),
                operator: row.get("operator"),
                payment: row.get("payment"),
                authentication: row.get("authentication"),
                point: StationPoint::from_wkt(&wkt)?,
                address: row_address(&row),
                charging: row_charging(&row),
                distance_m: row.get("distance"),
            });
        }
        Ok(nearby)
    }

    async fn commit_cluster(
        &self,
        member_ids: &[StationId],
        merged: &MergedStation,
        provenance: &[MergedStationSource],
    ) -> Result<StationId> {
        let ids: Vec<i64> = member_ids.iter().map(|id| id.0).collect();
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| VoltgridError::Storage(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query("UPDATE stations SET merge_status = 'is_duplicate' WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| VoltgridError::Storage(format!("Failed to flag cluster members: {}", e)))?;

        // ST_PointFromText is strict, so a missing point inserts as NULL.
        let merged_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO stations
                (source_id, data_source, operator, payment, authentication,
                 point, country_code, is_merged)
            VALUES ($1, $2, $3, $4, $5, ST_PointFromText($6, 4326)::geography, $7, TRUE)
            RETURNING id
            "#,
        )
        .bind(&merged.source_id)
        .bind(&merged.data_source)
        .bind(&merged.operator)
        .bind(&merged.payment)
        .bind(&merged.authentication)
        .bind(merged.point.as_ref().map(|p| p.to_wkt()))
        .bind(&merged.country_code)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| VoltgridError::Storage(format!("Failed to insert merged station: {}", e)))?;

        for member in provenance {
            sqlx::query(
                r#"
                INSERT INTO merged_station_source
                    (merged_station_id, station_id, duplicate_source_id)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(merged_id)
            .bind(member.station_id.0)
            .bind(&member.source_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                VoltgridError::Storage(format!("Failed to insert provenance row: {}", e))
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| VoltgridError::Storage(format!("Failed to commit cluster: {}", e)))?;

        Ok(StationId(merged_id))
    }

    async fn count_stations(&self, country_code: &str, merged: bool) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stations WHERE country_code = $1 AND is_merged = $2",
        )
        .bind(country_code)
        .bind(merged)
        .fetch_one(self.pool())
        .await
        .map_err(|e| VoltgridError::Storage(format!("Failed to count stations: {}", e)))?;
        Ok(count as u64)
    }
}
