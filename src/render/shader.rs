/// Maximum number of directional and point lights uploaded per frame.
pub(crate) const MAX_LIGHTS: usize = 8;

pub(crate) const MESH_SHADER: &str = r#"
struct Light {
    // w = 0: directional (xyz points towards the light), w = 1: point
    position: vec4<f32>,
    // rgb premultiplied by intensity, w = range (0 = unbounded)
    color: vec4<f32>,
}

struct GlobalUniform {
    view_proj: mat4x4<f32>,
    inv_sky_view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    // rgb ambient, w = number of lights in use
    ambient: vec4<f32>,
    lights: array<Light, 8>,
}

struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    color: vec4<f32>,
    // roughness, metalness, reflectance, unlit
    surface: vec4<f32>,
    // x: 0 front, 1 back, 2 both
    side: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

@group(2) @binding(0)
var environment_texture: texture_cube<f32>;
@group(2) @binding(1)
var environment_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = globals.view_proj * world_position;
    out.world_pos = world_position.xyz;

    let world_normal = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    ) * input.normal;

    out.normal = normalize(world_normal);
    return out;
}

@fragment
fn fs_main(input: VertexOutput, @builtin(front_facing) front_facing: bool) -> @location(0) vec4<f32> {
    let side = object.side.x;
    if (side < 0.5 && !front_facing) || (side > 0.5 && side < 1.5 && front_facing) {
        discard;
    }

    let base = object.color.rgb;
    if object.surface.w > 0.5 {
        return vec4<f32>(base, object.color.a);
    }

    var normal = normalize(input.normal);
    if !front_facing {
        normal = -normal;
    }
    let view_dir = normalize(globals.camera_position.xyz - input.world_pos);
    let roughness = object.surface.x;
    let metalness = object.surface.y;
    let shininess = mix(256.0, 4.0, roughness);
    let specular_tint = mix(vec3<f32>(0.04), base, metalness);

    var diffuse = vec3<f32>(0.0);
    var specular = vec3<f32>(0.0);
    let count = u32(globals.ambient.w);
    for (var i = 0u; i < count; i = i + 1u) {
        let light = globals.lights[i];
        var light_dir = normalize(light.position.xyz);
        var attenuation = 1.0;
        if light.position.w > 0.5 {
            let offset = light.position.xyz - input.world_pos;
            let dist = length(offset);
            light_dir = offset / max(dist, 0.0001);
            if light.color.w > 0.0 {
                attenuation = clamp(1.0 - dist / light.color.w, 0.0, 1.0);
            }
        }
        let n_dot_l = max(dot(normal, light_dir), 0.0);
        let half_dir = normalize(light_dir + view_dir);
        diffuse = diffuse + light.color.rgb * n_dot_l * attenuation;
        specular = specular
            + light.color.rgb * pow(max(dot(normal, half_dir), 0.0), shininess) * attenuation * n_dot_l;
    }

    let albedo = base * (1.0 - metalness);
    var color = albedo * (globals.ambient.rgb + diffuse) + specular_tint * specular;

    let reflectance = object.surface.z;
    if reflectance > 0.0 {
        let reflected_dir = reflect(-view_dir, normal);
        let reflected = textureSampleLevel(
            environment_texture,
            environment_sampler,
            reflected_dir,
            0.0
        ).rgb;
        color = mix(color, reflected * base, reflectance);
    }
    return vec4<f32>(color, object.color.a);
}
"#;

pub(crate) const SKY_SHADER: &str = r#"
struct Light {
    position: vec4<f32>,
    color: vec4<f32>,
}

struct GlobalUniform {
    view_proj: mat4x4<f32>,
    inv_sky_view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    ambient: vec4<f32>,
    lights: array<Light, 8>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(1) @binding(0)
var environment_texture: texture_cube<f32>;
@group(1) @binding(1)
var environment_sampler: sampler;

struct SkyOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) ndc: vec2<f32>,
}

// One triangle covering the whole screen.
@vertex
fn vs_sky(@builtin(vertex_index) index: u32) -> SkyOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    let ndc = uv * 2.0 - 1.0;
    var out: SkyOutput;
    out.position = vec4<f32>(ndc, 1.0, 1.0);
    out.ndc = ndc;
    return out;
}

@fragment
fn fs_sky(input: SkyOutput) -> @location(0) vec4<f32> {
    let world = globals.inv_sky_view_proj * vec4<f32>(input.ndc, 1.0, 1.0);
    let direction = normalize(world.xyz / world.w);
    return textureSampleLevel(environment_texture, environment_sampler, direction, 0.0);
}
"#;
