//! [`Listing`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{listing, Listing},
    infra::{
        database::{
            self,
            postgres::{Connection as _, LikePattern},
            Postgres,
        },
        Database,
    },
    read::{self, listing::list::Sort},
};

/// Columns of a [`Listing`] row [`decode()`] expects.
const COLUMNS: &str = "\
    id, seller_id, title, description, category, condition, size, \
    price, trade_only, images, status, created_at";

/// Decodes a [`Listing`] out of the provided [`Row`] having [`COLUMNS`].
fn decode(row: &Row) -> Listing {
    Listing {
        id: row.get("id"),
        seller_id: row.get("seller_id"),
        title: row.get("title"),
        description: row.get("description"),
        category: row.get("category"),
        condition: row.get("condition"),
        size: row.get("size"),
        price: row.get("price"),
        trade_only: row.get("trade_only"),
        images: row.get("images"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

/// Returns SQL `ORDER BY` expression of the provided [`Sort`].
///
/// Ties are always broken by ID to keep pages stable.
const fn order_by(sort: Sort) -> &'static str {
    match sort {
        Sort::Newest => "created_at DESC, id",
        Sort::Oldest => "created_at ASC, id",
        Sort::PriceLow => "price ASC NULLS LAST, id",
        Sort::PriceHigh => "price DESC NULLS LAST, id",
    }
}

impl
    Database<
        Select<By<read::listing::list::Page, read::listing::list::Selector>>,
    > for Postgres
{
    type Ok = read::listing::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::listing::list::Page, read::listing::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::listing::list::Selector {
            arguments,
            filter:
                read::listing::list::Filter {
                    category,
                    condition,
                    size,
                    search,
                    trade_only,
                    price,
                },
            order,
        } = by.into_inner();

        let status = listing::Status::Active;
        let limit = i64::try_from(arguments.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);
        let size = size.map(|s| LikePattern::containing(s.as_ref()));
        let search = search.map(|s| LikePattern::containing(s.as_ref()));

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&status, &limit, &offset];
        let mut filters = Vec::<String>::new();

        if let Some(category) = &category {
            ps.push(category);
            filters.push(format!("category = ${}::INT2", ps.len()));
        }
        if let Some(condition) = &condition {
            ps.push(condition);
            filters.push(format!("condition = ${}::INT2", ps.len()));
        }
        if let Some(size) = &size {
            ps.push(size);
            filters.push(format!("size ILIKE ${}::VARCHAR", ps.len()));
        }
        if let Some(search) = &search {
            ps.push(search);
            let idx = ps.len();
            filters.push(format!(
                "(title ILIKE ${idx}::VARCHAR \
                  OR description ILIKE ${idx}::VARCHAR)",
            ));
        }
        if let Some(trade_only) = &trade_only {
            ps.push(trade_only);
            filters.push(format!("trade_only = ${}::BOOL", ps.len()));
        }
        if let Some(min) = &price.min {
            ps.push(min);
            filters.push(format!("price >= ${}::NUMERIC", ps.len()));
        }
        if let Some(max) = &price.max {
            ps.push(max);
            filters.push(format!("price <= ${}::NUMERIC", ps.len()));
        }

        // Single round-trip: the total count always yields exactly one row,
        // and the lateral page joins to it (as `NULL`s if nothing matches).
        let sql = format!(
            "WITH matched AS (\
                 SELECT {COLUMNS} \
                 FROM listings \
                 WHERE status = $1::INT2 \
                       {filters}\
             ) \
             SELECT total.count, page.* \
             FROM (SELECT COUNT(*)::INT8 AS count FROM matched) AS total \
             LEFT JOIN LATERAL (\
                 SELECT * \
                 FROM matched \
                 ORDER BY {order} \
                 LIMIT $2::INT8 \
                 OFFSET $3::INT8\
             ) AS page ON true \
             ORDER BY {order}",
            filters =
                filters.iter().format_with("", |f, w| {
                    w(&format_args!("AND {f} "))
                }),
            order = order_by(order),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let total_count = rows
            .first()
            .map(|row| row.get::<_, i64>("count"))
            .and_then(|c| usize::try_from(c).ok())
            .unwrap_or_default();
        let listings = rows
            .iter()
            .filter(|row| row.get::<_, Option<listing::Id>>("id").is_some())
            .map(decode);

        Ok(read::listing::list::Page::new(
            arguments,
            listings,
            total_count,
        ))
    }
}

impl Database<Select<By<Option<Listing>, listing::Id>>> for Postgres {
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: listing::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, seller_id, title, description, category, condition, \
                   size, price, trade_only, images, status, created_at \
            FROM listings \
            WHERE id = $1::UUID \
            LIMIT 1";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(decode))
    }
}

impl Database<Insert<Listing>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(listing)).await.map_err(tracerr::wrap!())
    }
}

impl Database<Update<Listing>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        let Listing {
            id,
            seller_id,
            title,
            description,
            category,
            condition,
            size,
            price,
            trade_only,
            images,
            status,
            created_at,
        } = listing;

        const SQL: &str = "\
            INSERT INTO listings (\
                id, seller_id, title, description, \
                category, condition, size, \
                price, trade_only, images, \
                status, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::VARCHAR, \
                $5::INT2, $6::INT2, $7::VARCHAR, \
                $8::NUMERIC, $9::BOOL, $10::VARCHAR[], \
                $11::INT2, $12::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                category = EXCLUDED.category, \
                condition = EXCLUDED.condition, \
                size = EXCLUDED.size, \
                price = EXCLUDED.price, \
                trade_only = EXCLUDED.trade_only, \
                images = EXCLUDED.images, \
                status = EXCLUDED.status";
        self.exec(
            SQL,
            &[
                &id,
                &seller_id,
                &title,
                &description,
                &category,
                &condition,
                &size,
                &price,
                &trade_only,
                &images,
                &status,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
