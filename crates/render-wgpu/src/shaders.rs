/// WGSL shader for the instanced cube wall.
///
/// Terms mirror `cubewall_field::displace`; keep the two in step.
pub const CUBE_SHADER: &str = r#"
struct Scene {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    color_a: vec4<f32>,
    color_b: vec4<f32>,
    pointer: vec2<f32>,
    time: f32,
    radius: f32,
    depth: f32,
    cube_size: f32,
    exposure: f32,
    _pad: f32,
};

@group(0) @binding(0)
var<uniform> scene: Scene;

const LIGHT_DIR: vec3<f32> = vec3<f32>(-0.4, 0.7, 0.8);
const TAU: f32 = 6.2831853;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) origin: vec3<f32>,
    @location(3) seed: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) shade: f32,
    @location(1) spark: f32,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let away = instance.origin.xy - scene.pointer;
    let dist = length(away);
    let influence = 1.0 - smoothstep(0.0, scene.radius, dist);
    var dir = vec2<f32>(0.0, 0.0);
    if (dist > 1e-6) {
        dir = away / dist;
    }

    let wobble = sin(scene.time * 0.9 + instance.seed * TAU) * 0.25;
    let rest_z = (instance.seed - 0.5) * scene.depth;
    let push = influence * 0.8 * (1.0 - influence * 0.3);
    let jitter = sin(scene.time * 3.0 + instance.seed * 10.0) * 0.1;

    let offset = vec3<f32>(
        dir.x * push + jitter,
        dir.y * push + jitter * 0.5,
        rest_z + wobble + influence * 0.3,
    );
    let local = instance.origin + offset + vertex.position * scene.cube_size;

    let lambert = max(dot(normalize(vertex.normal), normalize(LIGHT_DIR)), 0.0);

    var out: VertexOutput;
    out.clip_position = scene.view_proj * scene.model * vec4<f32>(local, 1.0);
    out.shade = lambert * 0.85 + 0.15;
    out.spark = 0.55 + 0.45 * abs(sin(scene.time * 1.7 + instance.seed * 12.37));
    return out;
}

fn aces(x: vec3<f32>) -> vec3<f32> {
    let a = 2.51;
    let b = 0.03;
    let c = 2.43;
    let d = 0.59;
    let e = 0.14;
    return clamp((x * (a * x + b)) / (x * (c * x + d) + e), vec3<f32>(0.0), vec3<f32>(1.0));
}

fn base_color(in: VertexOutput) -> vec3<f32> {
    return mix(scene.color_a.rgb, scene.color_b.rgb, in.shade) * in.spark;
}

// Linear HDR output, tone mapped later by the composite pass.
@fragment
fn fs_hdr(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(base_color(in), 1.0);
}

// Direct-to-surface output when there is no post chain.
@fragment
fn fs_direct(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(aces(base_color(in) * scene.exposure), 1.0);
}
"#;

/// WGSL shader for the bloom chain: bright pass, separable blur, composite.
pub const BLOOM_SHADER: &str = r#"
struct Post {
    direction: vec2<f32>,
    strength: f32,
    threshold: f32,
    radius: f32,
    exposure: f32,
    _pad: vec2<f32>,
};

@group(0) @binding(0) var src_tex: texture_2d<f32>;
@group(0) @binding(1) var src_sampler: sampler;
@group(0) @binding(2) var<uniform> post: Post;

@group(1) @binding(0) var bloom_tex: texture_2d<f32>;
@group(1) @binding(1) var bloom_sampler: sampler;

struct FullscreenOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> FullscreenOutput {
    let x = f32((index << 1u) & 2u);
    let y = f32(index & 2u);
    var out: FullscreenOutput;
    out.clip_position = vec4<f32>(x * 2.0 - 1.0, 1.0 - y * 2.0, 0.0, 1.0);
    out.uv = vec2<f32>(x, y);
    return out;
}

fn luma(c: vec3<f32>) -> f32 {
    return dot(c, vec3<f32>(0.299, 0.587, 0.114));
}

@fragment
fn fs_bright(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let c = textureSample(src_tex, src_sampler, in.uv).rgb;
    let keep = smoothstep(post.threshold, post.threshold + 0.01, luma(c));
    return vec4<f32>(c * keep, 1.0);
}

@fragment
fn fs_blur(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let texel = 1.0 / vec2<f32>(textureDimensions(src_tex));
    let stride = post.direction * texel * (1.0 + post.radius * 2.0);
    var weights = array<f32, 5>(0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);
    var sum = textureSample(src_tex, src_sampler, in.uv).rgb * weights[0];
    for (var i = 1; i < 5; i = i + 1) {
        let o = stride * f32(i);
        sum += textureSample(src_tex, src_sampler, in.uv + o).rgb * weights[i];
        sum += textureSample(src_tex, src_sampler, in.uv - o).rgb * weights[i];
    }
    return vec4<f32>(sum, 1.0);
}

fn aces(x: vec3<f32>) -> vec3<f32> {
    let a = 2.51;
    let b = 0.03;
    let c = 2.43;
    let d = 0.59;
    let e = 0.14;
    return clamp((x * (a * x + b)) / (x * (c * x + d) + e), vec3<f32>(0.0), vec3<f32>(1.0));
}

@fragment
fn fs_composite(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let scene = textureSample(src_tex, src_sampler, in.uv).rgb;
    let glow = textureSample(bloom_tex, bloom_sampler, in.uv).rgb;
    let hdr = (scene + glow * post.strength) * post.exposure;
    return vec4<f32>(aces(hdr), 1.0);
}
"#;
