use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use super::child_rows::{parse_image_rows, parse_option_rows, ImageRow, RowAction, RowError};
use crate::core::error::{AppError, Result};
use crate::features::vehicles::dtos::{
    DeleteVehiclePreviewDto, DeletedVehicleDto, ImageRowInput, OptionRowInput, VehicleDetailDto,
    VehicleDto, VehicleImageDto, VehicleInput, VehicleWithOptionsDto, IMAGES_PREFIX,
    OPTIONS_PREFIX,
};
use crate::features::vehicles::models::{Vehicle, VehicleImage, VehicleOption};
use crate::modules::storage::{random_key, Storage};
use crate::shared::constants::{FEATURED_VEHICLE_LIMIT, GALLERY_IMAGE_PREFIX, VEHICLE_IMAGE_PREFIX};
use crate::shared::forms::{FormData, FormErrors, UploadedFile};
use crate::shared::validation::{file_extension, has_image_extension};

/// Gallery row whose new file (if any) is already in storage
struct PendingImage {
    key: Option<String>,
    input: ImageRowInput,
}

/// Service for vehicle showcase reads and CMS writes
pub struct VehicleService {
    pool: SqlitePool,
    storage: Storage,
}

impl VehicleService {
    pub fn new(pool: SqlitePool, storage: Storage) -> Self {
        Self { pool, storage }
    }

    /// Featured vehicles for the home page, with their options
    pub async fn list_featured(&self) -> Result<Vec<VehicleWithOptionsDto>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT id, title, brand, model, year, mileage, price, horsepower, engine, description,
                   main_image, image_url, featured, display_order, created_at, updated_at
            FROM vehicles
            WHERE featured = 1
            ORDER BY display_order DESC, created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(FEATURED_VEHICLE_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list featured vehicles: {:?}", e);
            AppError::Database(e)
        })?;

        self.with_options(vehicles).await
    }

    /// Every vehicle, with its options
    pub async fn list_all(&self) -> Result<Vec<VehicleWithOptionsDto>> {
        let vehicles = self.all_vehicles().await?;
        self.with_options(vehicles).await
    }

    /// Vehicles for the CMS list
    pub async fn cms_list(&self) -> Result<Vec<VehicleDto>> {
        let vehicles = self.all_vehicles().await?;
        Ok(vehicles
            .into_iter()
            .map(|v| VehicleDto::from_model(v, self.storage.as_ref()))
            .collect())
    }

    /// Vehicle with options and gallery images
    pub async fn get_detail(&self, id: i64) -> Result<VehicleDetailDto> {
        let vehicle = self.find_vehicle(id).await?;
        let options = self.options_of(id).await?;
        let images = self.images_of(id).await?;

        Ok(VehicleDetailDto {
            vehicle: VehicleDto::from_model(vehicle, self.storage.as_ref()),
            options: options.into_iter().map(Into::into).collect(),
            images: images
                .into_iter()
                .map(|i| VehicleImageDto::from_model(i, self.storage.as_ref()))
                .collect(),
        })
    }

    /// Creates a vehicle from a CMS submission.
    ///
    /// The vehicle row is saved as soon as its own fields are valid. If the
    /// option or gallery rows are then rejected, the vehicle stays saved and
    /// the returned form errors carry its id so the caller can continue in
    /// edit mode.
    pub async fn create(&self, mut form: FormData) -> Result<VehicleDetailDto> {
        let values = form.values();
        let mut errors = FormErrors::new();

        let input = VehicleInput::from_form(&form, &mut errors);
        let main_image = take_main_image(&mut form, &mut errors);
        let parent_valid = errors.is_empty();

        let options = parse_option_rows(form.take_rows(OPTIONS_PREFIX), &HashSet::new());
        let images = parse_image_rows(form.take_rows(IMAGES_PREFIX), &HashMap::new());
        options.report(OPTIONS_PREFIX, &mut errors);
        images.report(IMAGES_PREFIX, &mut errors);

        if !parent_valid {
            return Err(errors.with_values(values).into());
        }

        let vehicle_id = self.insert_vehicle(&input, main_image.as_ref()).await?;
        info!("Created vehicle {} ({})", vehicle_id, input.title);

        if !errors.is_empty() {
            info!(
                "Vehicle {} saved without its child rows: {}",
                vehicle_id, errors
            );
            return Err(errors.with_values(values).with_record_id(vehicle_id).into());
        }

        let pending = self.store_gallery_files(images.actions).await?;
        let stored_keys = pending_keys(&pending);

        let result = async {
            let mut tx = self.pool.begin().await?;
            apply_option_rows(&mut tx, vehicle_id, options.actions).await?;
            apply_image_rows(&mut tx, vehicle_id, pending).await?;
            tx.commit().await?;
            Ok::<(), AppError>(())
        }
        .await;

        if let Err(e) = result {
            tracing::error!("Failed to save child rows of vehicle {}: {}", vehicle_id, e);
            self.discard_files(&stored_keys).await;
            return Err(e);
        }

        self.get_detail(vehicle_id).await
    }

    /// Updates a vehicle and its child rows.
    ///
    /// Everything is validated before anything is written; the vehicle and
    /// its rows are then written in one transaction.
    pub async fn update(&self, id: i64, mut form: FormData) -> Result<VehicleDetailDto> {
        let current = self.find_vehicle(id).await?;
        let existing_options: HashSet<i64> =
            self.options_of(id).await?.into_iter().map(|o| o.id).collect();
        let existing_images: HashMap<i64, VehicleImage> = self
            .images_of(id)
            .await?
            .into_iter()
            .map(|i| (i.id, i))
            .collect();

        let values = form.values();
        let mut errors = FormErrors::new();

        let input = VehicleInput::from_form(&form, &mut errors);
        let main_image = take_main_image(&mut form, &mut errors);
        let options = parse_option_rows(form.take_rows(OPTIONS_PREFIX), &existing_options);
        let images = parse_image_rows(form.take_rows(IMAGES_PREFIX), &existing_images);
        options.report(OPTIONS_PREFIX, &mut errors);
        images.report(IMAGES_PREFIX, &mut errors);

        if !errors.is_empty() {
            debug!("Rejected update of vehicle {}: {}", id, errors);
            return Err(errors.with_values(values).into());
        }

        let main_key = match &main_image {
            Some(file) => Some(self.store_file(VEHICLE_IMAGE_PREFIX, file).await?),
            None => None,
        };
        let pending = match self.store_gallery_files(images.actions).await {
            Ok(pending) => pending,
            Err(e) => {
                self.discard_files(main_key.as_slice()).await;
                return Err(e);
            }
        };
        let mut stored_keys = pending_keys(&pending);
        stored_keys.extend(main_key.clone());

        let result = async {
            let mut tx = self.pool.begin().await?;
            update_vehicle_row(&mut tx, id, &input, main_key.as_deref()).await?;
            apply_option_rows(&mut tx, id, options.actions).await?;
            apply_image_rows(&mut tx, id, pending).await?;
            tx.commit().await?;
            Ok::<(), AppError>(())
        }
        .await;

        if let Err(e) = result {
            tracing::error!("Failed to update vehicle {}: {}", id, e);
            self.discard_files(&stored_keys).await;
            return Err(e);
        }

        info!("Updated vehicle {} ({} -> {})", id, current.title, input.title);
        self.get_detail(id).await
    }

    /// What deleting the vehicle would remove
    pub async fn delete_preview(&self, id: i64) -> Result<DeleteVehiclePreviewDto> {
        let vehicle = self.find_vehicle(id).await?;
        let (option_count, image_count) = child_counts(&self.pool, id).await?;

        Ok(DeleteVehiclePreviewDto {
            vehicle: VehicleDto::from_model(vehicle, self.storage.as_ref()),
            option_count,
            image_count,
        })
    }

    /// Deletes the vehicle; options and gallery rows go with it.
    ///
    /// Stored image files are left in place.
    pub async fn delete(&self, id: i64) -> Result<DeletedVehicleDto> {
        let vehicle = self.find_vehicle(id).await?;

        let mut tx = self.pool.begin().await?;
        let (options_removed, images_removed) = child_counts(&mut *tx, id).await?;

        let result = sqlx::query("DELETE FROM vehicles WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Vehicle {} not found", id)));
        }
        tx.commit().await?;

        info!(
            "Deleted vehicle {} ({}) with {} options and {} images",
            id, vehicle.title, options_removed, images_removed
        );

        Ok(DeletedVehicleDto {
            id,
            title: vehicle.title,
            options_removed,
            images_removed,
        })
    }

    async fn all_vehicles(&self) -> Result<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT id, title, brand, model, year, mileage, price, horsepower, engine, description,
                   main_image, image_url, featured, display_order, created_at, updated_at
            FROM vehicles
            ORDER BY display_order DESC, created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list vehicles: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(vehicles)
    }

    async fn find_vehicle(&self, id: i64) -> Result<Vehicle> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT id, title, brand, model, year, mileage, price, horsepower, engine, description,
                   main_image, image_url, featured, display_order, created_at, updated_at
            FROM vehicles
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        vehicle.ok_or_else(|| AppError::NotFound(format!("Vehicle {} not found", id)))
    }

    async fn options_of(&self, vehicle_id: i64) -> Result<Vec<VehicleOption>> {
        let options = sqlx::query_as::<_, VehicleOption>(
            r#"
            SELECT id, vehicle_id, label, sort_order
            FROM vehicle_options
            WHERE vehicle_id = ?
            ORDER BY sort_order, id
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(options)
    }

    async fn images_of(&self, vehicle_id: i64) -> Result<Vec<VehicleImage>> {
        let images = sqlx::query_as::<_, VehicleImage>(
            r#"
            SELECT id, vehicle_id, image, image_url, caption, sort_order
            FROM vehicle_images
            WHERE vehicle_id = ?
            ORDER BY sort_order, id
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    /// Attaches options to each vehicle with a single query
    async fn with_options(&self, vehicles: Vec<Vehicle>) -> Result<Vec<VehicleWithOptionsDto>> {
        let mut options_by_vehicle: HashMap<i64, Vec<VehicleOption>> = HashMap::new();

        if !vehicles.is_empty() {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
                "SELECT id, vehicle_id, label, sort_order FROM vehicle_options WHERE vehicle_id IN (",
            );
            let mut ids = query.separated(", ");
            for vehicle in &vehicles {
                ids.push_bind(vehicle.id);
            }
            ids.push_unseparated(") ORDER BY sort_order, id");

            let options = query
                .build_query_as::<VehicleOption>()
                .fetch_all(&self.pool)
                .await?;
            for option in options {
                options_by_vehicle
                    .entry(option.vehicle_id)
                    .or_default()
                    .push(option);
            }
        }

        Ok(vehicles
            .into_iter()
            .map(|v| {
                let options = options_by_vehicle.remove(&v.id).unwrap_or_default();
                VehicleWithOptionsDto {
                    vehicle: VehicleDto::from_model(v, self.storage.as_ref()),
                    options: options.into_iter().map(Into::into).collect(),
                }
            })
            .collect())
    }

    async fn insert_vehicle(
        &self,
        input: &VehicleInput,
        main_image: Option<&UploadedFile>,
    ) -> Result<i64> {
        let main_key = match main_image {
            Some(file) => Some(self.store_file(VEHICLE_IMAGE_PREFIX, file).await?),
            None => None,
        };
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO vehicles (
                title, brand, model, year, mileage, price, horsepower, engine, description,
                main_image, image_url, featured, display_order, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(input.brand)
        .bind(&input.model)
        .bind(input.year)
        .bind(input.mileage)
        .bind(input.price)
        .bind(input.horsepower)
        .bind(&input.engine)
        .bind(&input.description)
        .bind(main_key.as_deref())
        .bind(input.image_url.as_deref().unwrap_or(""))
        .bind(input.featured)
        .bind(input.display_order)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(e) => {
                tracing::error!("Failed to insert vehicle: {:?}", e);
                self.discard_files(main_key.as_slice()).await;
                Err(AppError::Database(e))
            }
        }
    }

    async fn store_file(&self, prefix: &str, file: &UploadedFile) -> Result<String> {
        let key = random_key(prefix, &file.file_name);
        self.storage
            .put(&key, file.data.clone(), &file.content_type)
            .await?;
        debug!("Stored {} ({} bytes) as {}", file.file_name, file.size(), key);
        Ok(key)
    }

    /// Writes new gallery files to storage ahead of the database transaction
    async fn store_gallery_files(
        &self,
        actions: Vec<RowAction<ImageRow>>,
    ) -> Result<Vec<RowAction<PendingImage>>> {
        let mut pending = Vec::with_capacity(actions.len());

        for action in actions {
            let stored = match action {
                RowAction::Create(row) => self
                    .store_image_row(row)
                    .await
                    .map(RowAction::Create),
                RowAction::Update { id, input } => self
                    .store_image_row(input)
                    .await
                    .map(|input| RowAction::Update { id, input }),
                RowAction::Delete(id) => Ok(RowAction::Delete(id)),
            };

            match stored {
                Ok(action) => pending.push(action),
                Err(e) => {
                    self.discard_files(&pending_keys(&pending)).await;
                    return Err(e);
                }
            }
        }

        Ok(pending)
    }

    async fn store_image_row(&self, row: ImageRow) -> Result<PendingImage> {
        let key = match &row.file {
            Some(file) => Some(self.store_file(GALLERY_IMAGE_PREFIX, file).await?),
            None => None,
        };
        Ok(PendingImage {
            key,
            input: row.input,
        })
    }

    /// Best-effort removal of files whose rows were never committed
    async fn discard_files(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.storage.delete(key).await {
                warn!("Failed to remove orphaned file {}: {}", key, e);
            }
        }
    }
}

/// Primary image upload, rejected unless it carries an image extension
fn take_main_image(form: &mut FormData, errors: &mut FormErrors) -> Option<UploadedFile> {
    let file = form.take_file("main_image")?;
    if has_image_extension(&file.file_name) {
        Some(file)
    } else {
        let ext = file_extension(&file.file_name).unwrap_or_else(|| "(unknown)".to_string());
        errors.add("main_image", RowError::InvalidImage(ext).to_string());
        None
    }
}

fn pending_keys(pending: &[RowAction<PendingImage>]) -> Vec<String> {
    pending
        .iter()
        .filter_map(|action| match action {
            RowAction::Create(row) | RowAction::Update { input: row, .. } => row.key.clone(),
            RowAction::Delete(_) => None,
        })
        .collect()
}

async fn child_counts<'e, E>(executor: E, vehicle_id: i64) -> Result<(i64, i64)>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let counts: (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM vehicle_options WHERE vehicle_id = ?1),
            (SELECT COUNT(*) FROM vehicle_images WHERE vehicle_id = ?1)
        "#,
    )
    .bind(vehicle_id)
    .fetch_one(executor)
    .await?;

    Ok(counts)
}

async fn update_vehicle_row(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
    input: &VehicleInput,
    new_main_image: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE vehicles
        SET title = ?, brand = ?, model = ?, year = ?, mileage = ?, price = ?, horsepower = ?,
            engine = ?, description = ?, main_image = COALESCE(?, main_image), image_url = ?,
            featured = ?, display_order = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.title)
    .bind(input.brand)
    .bind(&input.model)
    .bind(input.year)
    .bind(input.mileage)
    .bind(input.price)
    .bind(input.horsepower)
    .bind(&input.engine)
    .bind(&input.description)
    .bind(new_main_image)
    .bind(input.image_url.as_deref().unwrap_or(""))
    .bind(input.featured)
    .bind(input.display_order)
    .bind(Utc::now())
    .bind(id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn apply_option_rows(
    tx: &mut Transaction<'_, Sqlite>,
    vehicle_id: i64,
    actions: Vec<RowAction<OptionRowInput>>,
) -> Result<()> {
    for action in actions {
        match action {
            RowAction::Create(input) => {
                sqlx::query(
                    "INSERT INTO vehicle_options (vehicle_id, label, sort_order) VALUES (?, ?, ?)",
                )
                .bind(vehicle_id)
                .bind(&input.label)
                .bind(input.sort_order)
                .execute(&mut **tx)
                .await?;
            }
            RowAction::Update { id, input } => {
                sqlx::query(
                    "UPDATE vehicle_options SET label = ?, sort_order = ? WHERE id = ? AND vehicle_id = ?",
                )
                .bind(&input.label)
                .bind(input.sort_order)
                .bind(id)
                .bind(vehicle_id)
                .execute(&mut **tx)
                .await?;
            }
            RowAction::Delete(id) => {
                sqlx::query("DELETE FROM vehicle_options WHERE id = ? AND vehicle_id = ?")
                    .bind(id)
                    .bind(vehicle_id)
                    .execute(&mut **tx)
                    .await?;
            }
        }
    }
    Ok(())
}

async fn apply_image_rows(
    tx: &mut Transaction<'_, Sqlite>,
    vehicle_id: i64,
    actions: Vec<RowAction<PendingImage>>,
) -> Result<()> {
    for action in actions {
        match action {
            RowAction::Create(row) => {
                sqlx::query(
                    r#"
                    INSERT INTO vehicle_images (vehicle_id, image, image_url, caption, sort_order)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(vehicle_id)
                .bind(row.key.as_deref())
                .bind(row.input.image_url.as_deref().unwrap_or(""))
                .bind(&row.input.caption)
                .bind(row.input.sort_order)
                .execute(&mut **tx)
                .await?;
            }
            RowAction::Update { id, input: row } => {
                // A row without a new file or URL keeps its stored one
                sqlx::query(
                    r#"
                    UPDATE vehicle_images
                    SET image = COALESCE(?, image), image_url = COALESCE(?, image_url),
                        caption = ?, sort_order = ?
                    WHERE id = ? AND vehicle_id = ?
                    "#,
                )
                .bind(row.key.as_deref())
                .bind(row.input.image_url.as_deref())
                .bind(&row.input.caption)
                .bind(row.input.sort_order)
                .bind(id)
                .bind(vehicle_id)
                .execute(&mut **tx)
                .await?;
            }
            RowAction::Delete(id) => {
                sqlx::query("DELETE FROM vehicle_images WHERE id = ? AND vehicle_id = ?")
                    .bind(id)
                    .bind(vehicle_id)
                    .execute(&mut **tx)
                    .await?;
            }
        }
    }
    Ok(())
}
