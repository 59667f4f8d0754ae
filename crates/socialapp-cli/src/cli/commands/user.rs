//! Profile and like handlers.

use std::path::Path;

use anyhow::{Context, Result};
use socialapp_core::api::{ImageUpload, UserDetails};
use socialapp_core::core::gateway::Gateway;

use super::{cancellable, require_session};

pub async fn whoami(gateway: &Gateway) -> Result<()> {
    require_session(gateway).await?;
    let state = gateway.session().snapshot();
    let credentials = &state.credentials;

    println!("Handle:   {}", credentials.handle.as_deref().unwrap_or("-"));
    println!("Email:    {}", credentials.email.as_deref().unwrap_or("-"));
    if let Some(bio) = &credentials.bio {
        println!("Bio:      {bio}");
    }
    if let Some(website) = &credentials.website {
        println!("Website:  {website}");
    }
    if let Some(location) = &credentials.location {
        println!("Location: {location}");
    }
    if let Some(image_url) = &credentials.image_url {
        println!("Image:    {image_url}");
    }
    println!("Likes:    {}", state.likes.len());
    println!("Unread:   {}", state.unread_count());
    Ok(())
}

pub async fn edit(
    gateway: &Gateway,
    bio: Option<String>,
    website: Option<String>,
    location: Option<String>,
) -> Result<()> {
    let details = UserDetails {
        bio,
        website,
        location,
    };
    if details.is_empty() {
        anyhow::bail!("Nothing to update. Pass --bio, --website or --location.");
    }

    require_session(gateway).await?;
    cancellable(gateway, gateway.edit_user_details(details))
        .await
        .context("Failed to update profile")?;
    println!("Profile updated.");
    Ok(())
}

pub async fn upload_image(gateway: &Gateway, path: &Path) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());

    require_session(gateway).await?;
    cancellable(
        gateway,
        gateway.upload_image(ImageUpload::from_bytes(file_name, bytes)),
    )
    .await
    .context("Failed to upload image")?;
    println!("Profile image updated.");
    Ok(())
}

pub async fn like(gateway: &Gateway, scream_id: &str) -> Result<()> {
    require_session(gateway).await?;
    cancellable(gateway, gateway.like_scream(scream_id))
        .await
        .with_context(|| format!("Failed to like {scream_id}"))?;
    println!("Liked {scream_id}.");
    Ok(())
}

pub async fn unlike(gateway: &Gateway, scream_id: &str) -> Result<()> {
    require_session(gateway).await?;
    cancellable(gateway, gateway.unlike_scream(scream_id))
        .await
        .with_context(|| format!("Failed to unlike {scream_id}"))?;
    println!("Unliked {scream_id}.");
    Ok(())
}
